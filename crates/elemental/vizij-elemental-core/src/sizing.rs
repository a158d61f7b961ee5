//! Per-model sizing and orientation lookup tables.

use serde::{Deserialize, Serialize};

/// Coarse size bucket; formation scales are multiplied by the class factor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleClass {
    Tiny,
    Small,
    Medium,
    Large,
    Huge,
}

impl ScaleClass {
    #[inline]
    pub fn multiplier(self) -> f32 {
        match self {
            ScaleClass::Tiny => 0.35,
            ScaleClass::Small => 0.6,
            ScaleClass::Medium => 1.0,
            ScaleClass::Large => 1.5,
            ScaleClass::Huge => 2.2,
        }
    }
}

/// How an element's rotation is derived each frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrientationMode {
    /// Copy the camera orientation (billboard), rolled by the arc offset.
    Camera,
    /// Lie in the horizontal plane, facing up.
    Flat,
    /// Point +Y away from the mascot axis or along the formation's facing hint.
    Radial,
    /// Point +Y along the direction of travel.
    Velocity,
    /// Stay upright, yawed by the arc offset.
    Upright,
}

impl OrientationMode {
    /// Billboards are oriented in world space and pin the container's rotation.
    #[inline]
    pub fn needs_world_space(self) -> bool {
        matches!(self, OrientationMode::Camera)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ModelProfile {
    pub element_type: &'static str,
    pub model: &'static str,
    pub scale_class: ScaleClass,
    pub orientation: OrientationMode,
    /// Ring visuals read their arc phase from the seed attribute.
    pub ring: bool,
}

const fn profile(
    element_type: &'static str,
    model: &'static str,
    scale_class: ScaleClass,
    orientation: OrientationMode,
    ring: bool,
) -> ModelProfile {
    ModelProfile {
        element_type,
        model,
        scale_class,
        orientation,
        ring,
    }
}

use OrientationMode::*;
use ScaleClass::*;

static MODEL_PROFILES: &[ModelProfile] = &[
    profile("fire", "flame-tongue", Medium, Velocity, false),
    profile("fire", "flame-wisp", Small, Camera, false),
    profile("fire", "ember", Tiny, Camera, false),
    profile("fire", "fire-ring", Large, Camera, true),
    profile("ice", "ice-shard", Small, Radial, false),
    profile("ice", "ice-crystal", Medium, Radial, false),
    profile("ice", "snowflake", Tiny, Camera, false),
    profile("ice", "frost-ring", Large, Flat, true),
    profile("water", "droplet", Tiny, Velocity, false),
    profile("water", "bubble", Small, Camera, false),
    profile("water", "splash", Medium, Camera, false),
    profile("water", "water-ring", Large, Flat, true),
    profile("void", "void-shard", Small, Radial, false),
    profile("void", "void-orb", Medium, Camera, false),
    profile("void", "void-ring", Large, Camera, true),
    profile("void", "rift", Huge, Flat, false),
    profile("electric", "spark", Tiny, Velocity, false),
    profile("electric", "arc", Medium, Camera, true),
    profile("electric", "bolt", Large, Velocity, false),
    profile("earth", "pebble", Tiny, Upright, false),
    profile("earth", "stone", Small, Upright, false),
    profile("earth", "boulder", Large, Upright, false),
    profile("nature", "leaf", Small, Velocity, false),
    profile("nature", "petal", Tiny, Camera, false),
    profile("nature", "vine", Medium, Radial, false),
];

/// Profile used for models the table does not list.
pub const DEFAULT_PROFILE: ModelProfile = profile("", "", Medium, Camera, false);

/// Look up a model's profile by name.
pub fn model_profile(model: &str) -> Option<&'static ModelProfile> {
    MODEL_PROFILES.iter().find(|p| p.model == model)
}

/// Profile for a model, or the default profile when unlisted.
pub fn profile_or_default(model: &str) -> ModelProfile {
    model_profile(model).copied().unwrap_or(DEFAULT_PROFILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rings_carry_arc_phase() {
        for p in MODEL_PROFILES.iter().filter(|p| p.ring) {
            assert!(p.model.ends_with("ring") || p.model == "arc", "{}", p.model);
        }
    }

    #[test]
    fn unlisted_models_use_default() {
        let p = profile_or_default("mystery");
        assert_eq!(p.scale_class, ScaleClass::Medium);
        assert_eq!(p.orientation, OrientationMode::Camera);
    }
}
