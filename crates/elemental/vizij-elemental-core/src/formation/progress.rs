//! Progress remapping shared by the path-following formations.

use serde::{Deserialize, Serialize};

/// Optional truncation of the 0..1 progress timeline.
///
/// `reverse_at` mirrors the travel: the element reaches the end at
/// `reverse_at` and returns to the start by 1.0. `hold_at` makes it arrive
/// early and stay. When both are set `reverse_at` wins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressWindow {
    pub reverse_at: Option<f32>,
    pub hold_at: Option<f32>,
}

impl ProgressWindow {
    pub fn new(reverse_at: Option<f32>, hold_at: Option<f32>) -> Self {
        let valid = |v: Option<f32>| v.filter(|x| *x > 0.0 && *x <= 1.0);
        Self {
            reverse_at: valid(reverse_at).filter(|x| *x < 1.0),
            hold_at: valid(hold_at),
        }
    }

    #[inline]
    pub fn apply(&self, progress: f32) -> f32 {
        let p = progress.clamp(0.0, 1.0);
        if let Some(r) = self.reverse_at {
            if p <= r {
                p / r
            } else {
                1.0 - (p - r) / (1.0 - r)
            }
        } else if let Some(h) = self.hold_at {
            (p / h).min(1.0)
        } else {
            p
        }
    }
}

/// Remap batch progress to an element that starts `offset` later.
#[inline]
pub fn stagger(progress: f32, offset: f32) -> f32 {
    if offset <= 0.0 {
        return progress.clamp(0.0, 1.0);
    }
    if offset >= 1.0 {
        return if progress >= 1.0 { 1.0 } else { 0.0 };
    }
    ((progress - offset) / (1.0 - offset)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-6, "left={a} right={b}");
    }

    #[test]
    fn reverse_travels_out_and_back() {
        let w = ProgressWindow::new(Some(0.5), None);
        approx(w.apply(0.25), 0.5);
        approx(w.apply(0.5), 1.0);
        approx(w.apply(0.75), 0.5);
        approx(w.apply(1.0), 0.0);
    }

    #[test]
    fn hold_arrives_early() {
        let w = ProgressWindow::new(None, Some(0.4));
        approx(w.apply(0.2), 0.5);
        approx(w.apply(0.4), 1.0);
        approx(w.apply(0.9), 1.0);
    }

    #[test]
    fn out_of_range_points_are_ignored() {
        let w = ProgressWindow::new(Some(1.5), Some(0.0));
        assert_eq!(w, ProgressWindow::default());
        approx(w.apply(0.3), 0.3);
    }

    #[test]
    fn stagger_delays_start() {
        approx(stagger(0.2, 0.2), 0.0);
        approx(stagger(0.6, 0.2), 0.5);
        approx(stagger(1.0, 0.2), 1.0);
        approx(stagger(0.5, 0.0), 0.5);
    }
}
