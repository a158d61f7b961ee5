use std::f32::consts::TAU;

use vizij_elemental_core::glam::Vec3;
use vizij_elemental_core::{
    GeometrySet, SpawnOptions, Spawner, SpawnerConfig, StaticGeometryProvider, SurfacePoint,
};
use vizij_test_fixtures::{geometry, spawns, surfaces};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn spawner() -> Spawner<StaticGeometryProvider> {
    let mut provider = StaticGeometryProvider::new();
    for ty in geometry::keys() {
        let set: GeometrySet = geometry::load(&ty).unwrap();
        provider.register(ty, set);
    }
    Spawner::new(SpawnerConfig::default(), provider)
}

fn load(name: &str) -> (String, SpawnOptions) {
    let ty = spawns::element_type(name).unwrap().unwrap_or_else(|| "fire".into());
    (ty, spawns::load(name).unwrap())
}

#[test]
fn all_spawn_fixtures_parse() {
    for key in spawns::keys() {
        let json = spawns::json(&key).unwrap();
        SpawnOptions::from_json(&json).unwrap_or_else(|e| panic!("{key}: {e}"));
    }
}

#[test]
fn layers_share_one_pool() {
    let mut s = spawner();
    let (ty, opts) = load("fire-vortex");
    let ids = s.spawn(&ty, opts);
    assert_eq!(ids.len(), 7);

    let pool = s.pool("fire").unwrap();
    assert_eq!(pool.active_count(), 7);
    assert_eq!(pool.render_state().render_order, 4);
    assert!(!pool.render_state().depth_write);

    let rings: Vec<_> = s.elements().filter(|e| e.layer == 0).collect();
    assert_eq!(rings.len(), 3);
    for (i, el) in rings.iter().enumerate() {
        assert_eq!(el.model, "fire-ring");
        let a = pool.attributes()[pool.block(el.id).unwrap().main];
        assert_eq!(a.relay_index, i as f32);
        assert_eq!(a.seed, (i as f32 * 120f32.to_radians()).rem_euclid(TAU));
    }
    for el in s.elements().filter(|e| e.layer == 1) {
        let a = pool.attributes()[pool.block(el.id).unwrap().main];
        assert_eq!(a.relay_index, -1.0);
        assert!(el.model == "flame-wisp" || el.model == "ember");
    }
}

#[test]
fn windowed_layer_waits_for_its_window() {
    let mut s = spawner();
    let (ty, opts) = load("fire-vortex");
    s.spawn(&ty, opts);
    s.update(0.016, Some(0.05));
    let pool = s.pool("fire").unwrap();
    for el in s.elements().filter(|e| e.layer == 1) {
        let a = pool.attributes()[pool.block(el.id).unwrap().main];
        assert_eq!(a.opacity, 0.0);
    }
}

#[test]
fn respawn_resets_render_state() {
    let mut s = spawner();
    let (ty, opts) = load("fire-vortex");
    s.spawn(&ty, opts);
    s.spawn("fire", SpawnOptions::default().with_count(2));
    let state = s.pool("fire").unwrap().render_state();
    assert_eq!(state.render_order, 0);
}

#[test]
fn unknown_models_are_skipped() {
    let mut s = spawner();
    let (ty, opts) = load("electric-anchor");
    let ids = s.spawn(&ty, opts);
    assert_eq!(ids.len(), 3);
    let models: Vec<&str> = s.elements().map(|e| e.model.as_str()).collect();
    assert_eq!(models, ["spark", "arc", "spark"]);
}

#[test]
fn burst_ends_at_end_radius() {
    let mut s = spawner();
    let (ty, opts) = load("void-burst");
    let ids = s.spawn(&ty, opts);
    assert_eq!(ids.len(), 12);
    for _ in 0..10 {
        s.update(0.1, None);
    }
    let center = Vec3::new(0.0, 0.2, 0.0);
    for id in ids {
        let p = s.element(id).unwrap().position;
        approx((p - center).length(), 1.8, 1e-4);
    }
}

#[test]
fn surface_layer_respects_min_distance() {
    let mut s = spawner();
    let points: Vec<SurfacePoint> = surfaces::load("fibonacci-sphere-48").unwrap();
    s.set_mascot_surface(points);
    let (ty, opts) = load("ice-surface");
    let ids = s.spawn(&ty, opts);
    assert_eq!(ids.len(), 8);
    s.update(0.016, Some(1.0));
    let positions: Vec<Vec3> = ids.iter().map(|id| s.element(*id).unwrap().position).collect();
    for (i, a) in positions.iter().enumerate() {
        approx(a.length(), 1.05, 1e-3);
        for b in &positions[i + 1..] {
            assert!(a.distance(*b) > 0.0);
        }
    }
}

#[test]
fn surface_without_points_spawns_nothing() {
    let mut s = spawner();
    let (ty, opts) = load("ice-surface");
    assert!(s.spawn(&ty, opts).is_empty());
}

#[test]
fn unknown_tagged_layer_is_dropped_alone() {
    let mut s = spawner();
    let opts = SpawnOptions::from_json(
        r#"{ "mode": [
            { "mode": { "type": "tornado", "funnel": 3 }, "count": 2 },
            { "mode": "orbit", "count": 3 }
        ] }"#,
    )
    .unwrap();
    let ids = s.spawn("fire", opts);
    assert_eq!(ids.len(), 3);
    assert!(s.elements().all(|e| e.layer == 1));
}
