use bevy::prelude::*;
use vizij_elemental_core::{CameraFrame, MascotFrame};

use crate::components::{ElementalBatch, ElementalCamera, ElementalMascot};
use crate::resources::{BatchIndex, ElementalEvent, ElementalSpawner, GestureProgress};

/// Copy mascot and camera transforms into the spawner.
pub fn sync_scene_system(
    mascots: Query<(&GlobalTransform, &ElementalMascot)>,
    tagged: Query<&GlobalTransform, With<ElementalCamera>>,
    cameras: Query<&GlobalTransform, (With<Camera3d>, Without<ElementalCamera>)>,
    mut spawner: ResMut<ElementalSpawner>,
) {
    if let Some((gt, mascot)) = mascots.iter().next() {
        let (scale, rotation, position) = gt.to_scale_rotation_translation();
        spawner.0.set_mascot(MascotFrame {
            position,
            rotation,
            scale,
            bounding_radius: mascot.bounding_radius,
        });
    }
    if let Some(gt) = tagged.iter().next().or_else(|| cameras.iter().next()) {
        let (_, rotation, position) = gt.to_scale_rotation_translation();
        spawner.0.set_camera(CameraFrame { position, rotation });
    }
}

/// Advance the spawner by the frame delta and forward its events.
pub fn tick_spawner_system(
    time: Res<Time>,
    progress: Res<GestureProgress>,
    mut spawner: ResMut<ElementalSpawner>,
    mut events: EventWriter<ElementalEvent>,
) {
    let dt = time.delta_seconds();
    for event in spawner.0.update(dt, progress.0) {
        events.send(ElementalEvent(event.clone()));
    }
}

/// Mirror every ready pool onto one entity per element type.
pub fn publish_batches_system(
    mut commands: Commands,
    spawner: Res<ElementalSpawner>,
    mut index: ResMut<BatchIndex>,
    mut batches: Query<(&mut ElementalBatch, &mut Transform)>,
) {
    let container = spawner.0.container();
    let transform = Transform {
        translation: container.translation,
        rotation: container.rotation,
        scale: container.scale,
    };
    for pool in spawner.0.pools() {
        let ty = pool.element_type();
        if let Some(&entity) = index.map.get(ty) {
            if let Ok((mut batch, mut tf)) = batches.get_mut(entity) {
                batch.fill(pool);
                *tf = transform;
                continue;
            }
        }
        let entity = commands
            .spawn((
                ElementalBatch::from_pool(pool),
                SpatialBundle::from_transform(transform),
                Name::new(format!("elemental:{ty}")),
            ))
            .id();
        index.map.insert(ty.to_string(), entity);
    }
}
