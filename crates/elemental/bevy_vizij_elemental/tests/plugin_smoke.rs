use bevy::ecs::event::Events;
use bevy::prelude::*;
use bevy_vizij_elemental::{
    BatchIndex, ElementalBatch, ElementalEvent, ElementalMascot, ElementalSpawner,
    GestureProgress, VizijElementalPlugin,
};
use vizij_elemental_core::{GeometrySet, PoolStatus, SpawnOptions, SpawnerEvent};
use vizij_test_fixtures::{geometry, spawns};

fn fire_plugin() -> VizijElementalPlugin {
    let set: GeometrySet = geometry::load("fire").unwrap();
    VizijElementalPlugin::default().with_geometry("fire", set)
}

fn app_with(plugin: VizijElementalPlugin) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_plugins(plugin);
    app
}

#[test]
fn plugin_inserts_resources() {
    let app = app_with(VizijElementalPlugin::default());
    assert!(app.world().get_resource::<ElementalSpawner>().is_some());
    assert!(app.world().get_resource::<GestureProgress>().is_some());
    assert!(app.world().get_resource::<BatchIndex>().is_some());
}

#[test]
fn registered_geometry_is_ready_on_first_spawn() {
    let mut app = app_with(fire_plugin());
    let ids = {
        let mut spawner = app.world_mut().resource_mut::<ElementalSpawner>();
        spawner
            .0
            .spawn("fire", SpawnOptions::default().with_count(4).with_mode("orbit"))
    };
    assert_eq!(ids.len(), 4);
    let spawner = app.world().resource::<ElementalSpawner>();
    assert_eq!(spawner.0.status("fire"), Some(PoolStatus::Ready));
}

#[test]
fn pool_events_reach_the_ecs() {
    let mut app = app_with(fire_plugin());
    app.world_mut()
        .resource_mut::<ElementalSpawner>()
        .0
        .spawn("fire", SpawnOptions::default().with_count(2));
    app.update();

    let events = app.world().resource::<Events<ElementalEvent>>();
    let mut reader = events.get_reader();
    let ready = reader
        .read(events)
        .filter(|e| matches!(&e.0, SpawnerEvent::PoolReady { element_type, .. } if element_type == "fire"))
        .count();
    assert_eq!(ready, 1);
}

#[test]
fn batches_mirror_pools() {
    let mut app = app_with(fire_plugin());
    let opts: SpawnOptions = spawns::load("orbit-ring").unwrap();
    let ids = app
        .world_mut()
        .resource_mut::<ElementalSpawner>()
        .0
        .spawn("fire", opts);
    assert!(!ids.is_empty());

    // first frame queues the batch entity; second frame refreshes it in place
    app.update();
    app.update();

    let entity = *app
        .world()
        .resource::<BatchIndex>()
        .map
        .get("fire")
        .expect("batch entity for fire");
    let batch = app.world().get::<ElementalBatch>(entity).unwrap();
    assert_eq!(batch.element_type, "fire");
    assert!(batch.visible_count > 0);
    assert_eq!(batch.matrices.len(), batch.visible_count);
    assert_eq!(batch.attributes.len(), batch.visible_count);

    let index_len = app.world().resource::<BatchIndex>().map.len();
    assert_eq!(index_len, 1);
}

#[test]
fn mascot_transform_drives_container() {
    let mut app = app_with(fire_plugin());
    let tf = Transform::from_xyz(1.0, 2.0, 0.0);
    app.world_mut().spawn((
        tf,
        GlobalTransform::from(tf),
        ElementalMascot {
            bounding_radius: 2.0,
        },
    ));
    app.world_mut()
        .resource_mut::<ElementalSpawner>()
        .0
        .spawn("fire", SpawnOptions::default().with_count(1));
    app.update();
    app.update();

    let spawner = app.world().resource::<ElementalSpawner>();
    assert_eq!(spawner.0.mascot().bounding_radius, 2.0);
    assert_eq!(spawner.0.container().translation, Vec3::new(1.0, 2.0, 0.0));

    let entity = app.world().resource::<BatchIndex>().map["fire"];
    let batch_tf = app.world().get::<Transform>(entity).unwrap();
    assert_eq!(batch_tf.translation, Vec3::new(1.0, 2.0, 0.0));
}

fn axis_position_at(progress: f32) -> Vec3 {
    let mut app = app_with(fire_plugin());
    app.world_mut().resource_mut::<GestureProgress>().0 = Some(progress);
    app.world_mut()
        .resource_mut::<ElementalSpawner>()
        .0
        .spawn("fire", SpawnOptions::default().with_count(1).with_mode("axis-travel"));
    app.update();

    let spawner = app.world().resource::<ElementalSpawner>();
    let el = spawner.0.elements().next().unwrap();
    el.position
}

#[test]
fn gesture_progress_resource_is_forwarded() {
    let early = axis_position_at(0.1);
    let late = axis_position_at(0.9);
    assert!((early.y - late.y).abs() > 1e-3, "early={early} late={late}");
}
