//! Bevy adapter for the Vizij elemental core.
//!
//! The plugin owns an `ElementalSpawner` resource and runs, in `Update`:
//! scene sync (mascot + camera) → spawner tick → batch publishing. Rendering
//! the published `ElementalBatch` buffers is left to the host.

use bevy::prelude::*;
use vizij_elemental_core::{GeometrySet, Spawner, SpawnerConfig, StaticGeometryProvider};

pub mod components;
pub mod resources;
pub mod systems;

pub use components::{ElementalBatch, ElementalCamera, ElementalMascot};
pub use resources::{BatchIndex, ElementalEvent, ElementalSpawner, GestureProgress};
pub use systems::{publish_batches_system, sync_scene_system, tick_spawner_system};

#[derive(Default, Clone)]
pub struct VizijElementalPlugin {
    pub config: SpawnerConfig,
    /// Geometry per element type, available to the spawner from the start.
    pub geometry: Vec<(String, GeometrySet)>,
}

impl VizijElementalPlugin {
    pub fn with_geometry(mut self, element_type: impl Into<String>, set: GeometrySet) -> Self {
        self.geometry.push((element_type.into(), set));
        self
    }
}

impl Plugin for VizijElementalPlugin {
    fn build(&self, app: &mut App) {
        let mut provider = StaticGeometryProvider::new();
        for (ty, set) in &self.geometry {
            provider.register(ty.clone(), set.clone());
        }
        app.insert_resource(ElementalSpawner(Spawner::new(self.config.clone(), provider)))
            .insert_resource(GestureProgress::default())
            .insert_resource(BatchIndex::default())
            .add_event::<ElementalEvent>()
            .add_systems(
                Update,
                (
                    sync_scene_system,
                    tick_spawner_system,
                    publish_batches_system,
                )
                    .chain(),
            );
    }
}
