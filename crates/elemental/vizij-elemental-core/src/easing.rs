//! Easing curves shared by every formation and the animation state.
//!
//! Curves are selected by name in configuration; an unknown name falls back
//! to `linear` with a warning.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Easing {
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInSine,
    EaseOutSine,
    EaseInOutSine,
    EaseInBack,
    EaseOutBack,
    EaseOutExpo,
}

const BACK_C1: f32 = 1.701_58;
const BACK_C3: f32 = BACK_C1 + 1.0;

impl Easing {
    pub const ALL: [Easing; 13] = [
        Easing::Linear,
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInOutQuad,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseInSine,
        Easing::EaseOutSine,
        Easing::EaseInOutSine,
        Easing::EaseInBack,
        Easing::EaseOutBack,
        Easing::EaseOutExpo,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseInQuad => "easeInQuad",
            Easing::EaseOutQuad => "easeOutQuad",
            Easing::EaseInOutQuad => "easeInOutQuad",
            Easing::EaseInCubic => "easeInCubic",
            Easing::EaseOutCubic => "easeOutCubic",
            Easing::EaseInOutCubic => "easeInOutCubic",
            Easing::EaseInSine => "easeInSine",
            Easing::EaseOutSine => "easeOutSine",
            Easing::EaseInOutSine => "easeInOutSine",
            Easing::EaseInBack => "easeInBack",
            Easing::EaseOutBack => "easeOutBack",
            Easing::EaseOutExpo => "easeOutExpo",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name() == name)
    }

    /// Evaluate the curve at `t`, clamped to [0, 1].
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => t * (2.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseInSine => 1.0 - (t * PI / 2.0).cos(),
            Easing::EaseOutSine => (t * PI / 2.0).sin(),
            Easing::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Easing::EaseInBack => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Easing::EaseOutBack => {
                let u = t - 1.0;
                1.0 + BACK_C3 * u * u * u + BACK_C1 * u * u
            }
            Easing::EaseOutExpo => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
        }
    }
}

impl From<String> for Easing {
    fn from(name: String) -> Self {
        Easing::from_name(&name).unwrap_or_else(|| {
            log::warn!("unknown easing '{name}', using linear");
            Easing::Linear
        })
    }
}

impl From<Easing> for String {
    fn from(e: Easing) -> Self {
        e.name().to_string()
    }
}

/// Linear interpolation of scalars.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_curve_pins_endpoints() {
        for e in Easing::ALL {
            assert!(e.apply(0.0).abs() < 1e-5, "{} at 0", e.name());
            assert!((e.apply(1.0) - 1.0).abs() < 1e-5, "{} at 1", e.name());
        }
    }

    #[test]
    fn input_is_clamped() {
        assert_eq!(Easing::EaseInQuad.apply(-3.0), 0.0);
        assert_eq!(Easing::EaseInQuad.apply(4.0), 1.0);
    }

    #[test]
    fn unknown_name_falls_back_to_linear() {
        let e: Easing = serde_json::from_str("\"wobble\"").expect("string easing");
        assert_eq!(e, Easing::Linear);
        let e: Easing = serde_json::from_str("\"easeOutCubic\"").expect("string easing");
        assert_eq!(e, Easing::EaseOutCubic);
    }
}
