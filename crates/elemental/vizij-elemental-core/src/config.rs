//! Spawner configuration: pool sizing, trail copies, fades and seeding.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Per-type pool sizing override.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSizing {
    pub max_elements: usize,
    pub trail_count: usize,
}

/// Configuration for pool sizing and frame behavior.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpawnerConfig {
    /// Maximum logical elements per element type.
    pub max_elements_per_type: usize,
    /// Trail copies per element; each element occupies `1 + trail_count` slots.
    pub trail_count: usize,
    /// Seconds of positional lag between successive trail copies.
    pub trail_spacing: f32,
    /// Fade used by `despawn(.., animated = true)` and by elements without an animation state.
    pub despawn_fade: f32,
    /// Push toward the camera for billboards, in mascot-radius units.
    pub camera_push: f32,
    /// Gesture length used when a batch gives none and the host supplies no progress.
    pub default_gesture_duration: f32,
    pub seed: u64,
    pub pool_overrides: HashMap<String, PoolSizing>,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            max_elements_per_type: 24,
            trail_count: 3,
            trail_spacing: 0.035,
            despawn_fade: 0.5,
            camera_push: 0.0,
            default_gesture_duration: 1.0,
            seed: 0x5eed_e1e7,
            pool_overrides: HashMap::new(),
        }
    }
}

impl SpawnerConfig {
    /// Effective sizing for one element type.
    pub fn sizing_for(&self, element_type: &str) -> PoolSizing {
        self.pool_overrides
            .get(element_type)
            .copied()
            .unwrap_or(PoolSizing {
                max_elements: self.max_elements_per_type,
                trail_count: self.trail_count,
            })
    }
}
