//! Per-element lifecycle: WAITING → ENTERING → HOLDING → EXITING → DONE.
//!
//! Transitions are driven by element age against the configured durations
//! and, when the host supplies gesture progress, by `appearAt`/`disappearAt`
//! windows expressed as fractions of the whole gesture.

use serde::{Deserialize, Serialize};

use crate::easing::{lerp, Easing};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Waiting,
    Entering,
    Holding,
    Exiting,
    Done,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimationConfig {
    /// Gesture fraction at which the element starts entering.
    pub appear_at: Option<f32>,
    /// Gesture fraction at which the element starts exiting.
    pub disappear_at: Option<f32>,
    /// Added to `appear_at` per element index.
    pub appear_stagger: f32,
    /// Seconds before entering.
    pub delay: f32,
    pub delay_stagger: f32,
    pub enter_duration: f32,
    pub exit_duration: f32,
    /// Seconds spent holding before exiting on its own; `None` holds until told.
    pub hold_duration: Option<f32>,
    pub enter_easing: Easing,
    pub exit_easing: Easing,
    /// Opacity while holding.
    pub opacity: f32,
    /// Scale factor at the start of the enter phase (and end of exit).
    pub enter_scale: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            appear_at: None,
            disappear_at: None,
            appear_stagger: 0.0,
            delay: 0.0,
            delay_stagger: 0.0,
            enter_duration: 0.3,
            exit_duration: 0.4,
            hold_duration: None,
            enter_easing: Easing::EaseOutQuad,
            exit_easing: Easing::EaseInQuad,
            opacity: 1.0,
            enter_scale: 0.6,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AnimationState {
    cfg: AnimationConfig,
    appear_at: Option<f32>,
    delay: f32,
    phase: Phase,
    /// Seconds spent in the current phase.
    phase_time: f32,
    exit_from_opacity: f32,
    exit_from_scale: f32,
}

impl AnimationState {
    /// State for the `index`-th element of a batch; staggers shift its window.
    pub fn new(cfg: AnimationConfig, index: usize) -> Self {
        let i = index as f32;
        let appear_at = if cfg.appear_at.is_some() || cfg.appear_stagger > 0.0 {
            Some((cfg.appear_at.unwrap_or(0.0) + i * cfg.appear_stagger).clamp(0.0, 1.0))
        } else {
            None
        };
        let delay = (cfg.delay + i * cfg.delay_stagger).max(0.0);
        Self {
            cfg,
            appear_at,
            delay,
            phase: Phase::Waiting,
            phase_time: 0.0,
            exit_from_opacity: 0.0,
            exit_from_scale: 1.0,
        }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.cfg
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        !matches!(self.phase, Phase::Waiting | Phase::Done)
    }

    /// Whether the element carries its own gesture window.
    pub fn has_window(&self) -> bool {
        self.appear_at.is_some() || self.cfg.disappear_at.is_some()
    }

    /// Advance by `dt`; `time` is seconds since spawn. Returns false once DONE.
    pub fn update(&mut self, time: f32, dt: f32, gesture_progress: Option<f32>) -> bool {
        let dt = dt.max(0.0);
        match self.phase {
            Phase::Done => return false,
            Phase::Waiting => {
                let gated = match (self.appear_at, gesture_progress) {
                    (Some(at), Some(gp)) => gp >= at,
                    _ => true,
                };
                if time >= self.delay && gated {
                    self.enter_phase(Phase::Entering, 0.0);
                }
            }
            Phase::Entering => {
                self.phase_time += dt;
                if self.phase_time >= self.cfg.enter_duration {
                    let carry = self.phase_time - self.cfg.enter_duration.max(0.0);
                    self.enter_phase(Phase::Holding, carry);
                }
            }
            Phase::Holding => self.phase_time += dt,
            Phase::Exiting => {
                self.phase_time += dt;
                if self.phase_time >= self.cfg.exit_duration {
                    self.enter_phase(Phase::Done, 0.0);
                    return false;
                }
            }
        }

        if matches!(self.phase, Phase::Entering | Phase::Holding) {
            let held_out = self.phase == Phase::Holding
                && self.cfg.hold_duration.is_some_and(|h| self.phase_time >= h);
            let window_out = match (self.cfg.disappear_at, gesture_progress) {
                (Some(at), Some(gp)) => gp >= at,
                _ => false,
            };
            if held_out || window_out {
                self.trigger_exit();
            }
        }
        true
    }

    /// Jump to EXITING from any state except DONE, starting from the current look.
    pub fn trigger_exit(&mut self) {
        if matches!(self.phase, Phase::Exiting | Phase::Done) {
            return;
        }
        self.exit_from_opacity = self.opacity();
        self.exit_from_scale = self.scale_factor();
        self.enter_phase(Phase::Exiting, 0.0);
    }

    pub fn opacity(&self) -> f32 {
        match self.phase {
            Phase::Waiting | Phase::Done => 0.0,
            Phase::Entering => self.cfg.opacity * self.cfg.enter_easing.apply(self.enter_t()),
            Phase::Holding => self.cfg.opacity,
            Phase::Exiting => {
                self.exit_from_opacity * (1.0 - self.cfg.exit_easing.apply(self.exit_t()))
            }
        }
    }

    pub fn scale_factor(&self) -> f32 {
        match self.phase {
            Phase::Waiting => self.cfg.enter_scale,
            Phase::Entering => lerp(
                self.cfg.enter_scale,
                1.0,
                self.cfg.enter_easing.apply(self.enter_t()),
            ),
            Phase::Holding => 1.0,
            Phase::Exiting => lerp(
                self.exit_from_scale,
                self.cfg.enter_scale,
                self.cfg.exit_easing.apply(self.exit_t()),
            ),
            Phase::Done => 0.0,
        }
    }

    /// Gesture progress remapped to this element's appear/disappear window.
    pub fn local_progress(&self, gesture_progress: f32) -> f32 {
        let start = self.appear_at.unwrap_or(0.0);
        let end = self.cfg.disappear_at.unwrap_or(1.0);
        if end - start <= f32::EPSILON {
            return if gesture_progress >= end { 1.0 } else { 0.0 };
        }
        ((gesture_progress - start) / (end - start)).clamp(0.0, 1.0)
    }

    fn enter_phase(&mut self, phase: Phase, carry: f32) {
        log::trace!("animation {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.phase_time = carry;
    }

    fn enter_t(&self) -> f32 {
        if self.cfg.enter_duration <= 0.0 {
            1.0
        } else {
            self.phase_time / self.cfg.enter_duration
        }
    }

    fn exit_t(&self) -> f32 {
        if self.cfg.exit_duration <= 0.0 {
            1.0
        } else {
            self.phase_time / self.cfg.exit_duration
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "left={a} right={b}");
    }

    #[test]
    fn waits_for_delay_then_enters() {
        let cfg = AnimationConfig {
            delay: 0.2,
            ..Default::default()
        };
        let mut s = AnimationState::new(cfg, 0);
        assert!(s.update(0.1, 0.1, None));
        assert_eq!(s.phase(), Phase::Waiting);
        assert_eq!(s.opacity(), 0.0);
        s.update(0.2, 0.1, None);
        assert_eq!(s.phase(), Phase::Entering);
    }

    #[test]
    fn stagger_shifts_appear_window() {
        let cfg = AnimationConfig {
            appear_at: Some(0.1),
            appear_stagger: 0.2,
            ..Default::default()
        };
        let mut s = AnimationState::new(cfg, 2);
        s.update(0.0, 0.0, Some(0.4));
        assert_eq!(s.phase(), Phase::Waiting);
        s.update(0.1, 0.1, Some(0.5));
        assert_eq!(s.phase(), Phase::Entering);
        approx(s.local_progress(0.5), 0.0);
        approx(s.local_progress(0.75), 0.5);
    }

    #[test]
    fn exit_from_waiting_is_invisible() {
        let mut s = AnimationState::new(AnimationConfig::default(), 0);
        s.trigger_exit();
        assert_eq!(s.phase(), Phase::Exiting);
        assert_eq!(s.opacity(), 0.0);
        assert!(!s.update(1.0, 1.0, None));
        assert_eq!(s.phase(), Phase::Done);
    }
}
