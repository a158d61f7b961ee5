use bevy::prelude::*;
use vizij_elemental_core::{InstanceAttributes, InstancePool, PoolRenderState};

/// Marks the mascot the elements gather around.
/// `bounding_radius` is in the entity's local (unscaled) units.
#[derive(Component, Debug, Clone, Copy)]
pub struct ElementalMascot {
    pub bounding_radius: f32,
}

impl Default for ElementalMascot {
    fn default() -> Self {
        Self {
            bounding_radius: 1.0,
        }
    }
}

/// Camera used for billboards and surface sampling. Without it the first
/// `Camera3d` is used.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct ElementalCamera;

/// Instance buffers of one element type, refreshed every frame.
/// Only the visible prefix of the pool is copied.
#[derive(Component, Debug, Clone, Default)]
pub struct ElementalBatch {
    pub element_type: String,
    pub matrices: Vec<[f32; 16]>,
    pub attributes: Vec<InstanceAttributes>,
    pub visible_count: usize,
    pub render_state: PoolRenderState,
}

impl ElementalBatch {
    pub fn from_pool(pool: &InstancePool) -> Self {
        let mut batch = Self {
            element_type: pool.element_type().to_string(),
            ..Default::default()
        };
        batch.fill(pool);
        batch
    }

    pub fn fill(&mut self, pool: &InstancePool) {
        let n = pool.visible_count();
        self.visible_count = n;
        self.matrices.clear();
        self.matrices.extend_from_slice(&pool.matrices()[..n]);
        self.attributes.clear();
        self.attributes.extend_from_slice(&pool.attributes()[..n]);
        if &self.render_state != pool.render_state() {
            self.render_state = pool.render_state().clone();
        }
    }
}
