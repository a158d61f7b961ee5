use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::SeedableRng;
use vizij_elemental_core::formation::{
    expand_shape, Axis, ExpandContext, Formation, FormationShape, FormationSpec,
};
use vizij_elemental_core::glam::Vec3;
use vizij_elemental_core::LandmarkTable;

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

#[test]
fn every_mode_expands_to_count() {
    let table = LandmarkTable::default();
    let surface: Vec<_> = (0..40)
        .map(|i| {
            let a = i as f32 * TAU / 40.0;
            let p = Vec3::new(a.cos(), 0.0, a.sin());
            vizij_elemental_core::SurfacePoint {
                position: p,
                normal: p,
            }
        })
        .collect();
    let mut rng = StdRng::seed_from_u64(11);
    for name in ["orbit", "axis-travel", "anchor", "radial-burst", "surface"] {
        let spec = FormationSpec::from_shorthand(name).unwrap();
        let formation = Formation::parse(&spec, &table).unwrap();
        for count in [0usize, 1, 5, 12] {
            let mut ctx = ExpandContext {
                rng: &mut rng,
                surface: &surface,
                view_dir: Vec3::Z,
            };
            assert_eq!(formation.expand(count, &mut ctx).len(), count, "{name} x{count}");
        }
    }
}

#[test]
fn centered_stack_has_zero_mean() {
    let shape = FormationShape::Stack {
        spacing: 0.3,
        axis: Axis::Y,
        centered: true,
        stagger: 0.0,
    };
    for count in [1usize, 2, 5, 8] {
        let offs = expand_shape(Some(&shape), count, Axis::Y);
        assert_eq!(offs.len(), count);
        let mean = offs.iter().map(|o| o.position.y).sum::<f32>() / count as f32;
        approx(mean, 0.0, 1e-6);
    }
}

#[test]
fn spiral_rotation_accumulates_arc_offset() {
    for arc in [60.0f32, 90.0, 120.0] {
        let shape = FormationShape::Spiral {
            arc_offset: arc,
            spacing: 0.0,
            stagger: 0.0,
        };
        let offs = expand_shape(Some(&shape), 7, Axis::Y);
        for (i, o) in offs.iter().enumerate() {
            let expected = (i as f32 * arc.to_radians()).rem_euclid(TAU);
            assert_eq!(o.rotation, expected, "arc={arc} i={i}");
        }
    }
}

#[test]
fn mandala_centers_first_element() {
    let shape = FormationShape::Mandala {
        radius: 0.4,
        arc_offset: 0.0,
        stagger: 0.0,
    };
    let offs = expand_shape(Some(&shape), 5, Axis::Y);
    assert_eq!(offs[0].position, Vec3::ZERO);
    for o in &offs[1..] {
        approx(o.position.length(), 0.4, 1e-5);
        approx(o.position.y, 0.0, 1e-6);
    }
}

#[test]
fn stagger_stays_below_one() {
    let shape = FormationShape::Pairs {
        spread: 20.0,
        stagger: 0.3,
    };
    let offs = expand_shape(Some(&shape), 6, Axis::Y);
    approx(offs[1].progress_offset, 0.3, 1e-6);
    assert!(offs.iter().all(|o| o.progress_offset < 1.0));
}

#[test]
fn shapes_parse_from_json() {
    let shape: FormationShape =
        serde_json::from_str(r#"{ "type": "cluster", "groups": 2 }"#).unwrap();
    let offs = expand_shape(Some(&shape), 4, Axis::Y);
    assert_eq!(offs.len(), 4);
    assert!(shape.assigns_rotation());
}
