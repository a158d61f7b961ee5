use bevy::prelude::*;
use hashbrown::HashMap;
use vizij_elemental_core::{Spawner, SpawnerEvent, StaticGeometryProvider};

/// The spawner, driven once per frame by `tick_spawner_system`.
#[derive(Resource)]
pub struct ElementalSpawner(pub Spawner<StaticGeometryProvider>);

/// Host-driven gesture progress (0..1); `None` lets batches run on their own clocks.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct GestureProgress(pub Option<f32>);

/// Element type → entity carrying its `ElementalBatch`.
#[derive(Resource, Default)]
pub struct BatchIndex {
    pub map: HashMap<String, Entity>,
}

/// Spawner events forwarded into the ECS.
#[derive(Event, Debug, Clone)]
pub struct ElementalEvent(pub SpawnerEvent);
