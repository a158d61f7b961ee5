use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vizij_elemental_core::geometry::quad_variant;
use vizij_elemental_core::glam::{Quat, Vec3};
use vizij_elemental_core::{ElementId, InstancePool, MaterialHandle, MergedGeometry, PoolSizing};

fn pool(max_elements: usize, trail_count: usize) -> InstancePool {
    let geometry = MergedGeometry::merge(&[quad_variant("a"), quad_variant("b")]).unwrap();
    InstancePool::new(
        "fire",
        PoolSizing {
            max_elements,
            trail_count,
        },
        0.035,
        geometry,
        MaterialHandle("fire".into()),
    )
}

fn check(p: &InstancePool) {
    assert_eq!(
        p.free_slot_count() + p.active_count() * p.slots_per_element(),
        p.capacity()
    );
}

#[test]
fn invariant_holds_under_random_churn() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut p = pool(8, 3);
    let mut live: Vec<ElementId> = Vec::new();
    for n in 0..2000u32 {
        match rng.gen_range(0..5) {
            0 | 1 => {
                let id = ElementId(n);
                if p.spawn(id, Vec3::X, Quat::IDENTITY, 1.0, 1, None, None) {
                    live.push(id);
                } else {
                    assert_eq!(p.free_blocks(), 0);
                }
            }
            2 if !live.is_empty() => {
                let id = live[rng.gen_range(0..live.len())];
                p.begin_despawn(id, rng.gen_range(0.0..0.3));
            }
            3 if !live.is_empty() => {
                let id = live.swap_remove(rng.gen_range(0..live.len()));
                p.remove_immediate(id);
            }
            _ => {
                for id in p.tick(0.05) {
                    live.retain(|l| *l != id);
                }
            }
        }
        check(&p);
        assert_eq!(p.active_count(), live.len());
    }
}

#[test]
fn blocks_are_contiguous_and_disjoint() {
    let mut p = pool(5, 2);
    for n in 0..5 {
        assert!(p.spawn(ElementId(n), Vec3::ZERO, Quat::IDENTITY, 1.0, 0, None, None));
    }
    let mut mains: Vec<usize> = (0..5).map(|n| p.block(ElementId(n)).unwrap().main).collect();
    mains.sort();
    assert_eq!(mains, [0, 3, 6, 9, 12]);
    for n in 0..5u32 {
        let main = p.block(ElementId(n)).unwrap().main;
        let attrs = &p.attributes()[main..main + 3];
        assert_eq!(attrs[0].trail_parent, -1.0);
        assert_eq!(attrs[1].trail_parent, main as f32);
        assert_eq!(attrs[2].trail_index, 2.0);
    }
}

#[test]
fn visible_count_tracks_highest_block() {
    let mut p = pool(4, 1);
    for n in 0..3 {
        p.spawn(ElementId(n), Vec3::ZERO, Quat::IDENTITY, 1.0, 0, None, None);
    }
    assert_eq!(p.visible_count(), 6);
    p.remove_immediate(ElementId(2));
    assert_eq!(p.visible_count(), 4);
    p.remove_immediate(ElementId(0));
    assert_eq!(p.visible_count(), 4);
    p.dispose();
    assert_eq!(p.visible_count(), 0);
    check(&p);
}

#[test]
fn dispose_cancels_pending_reclaim() {
    let mut p = pool(2, 0);
    p.spawn(ElementId(0), Vec3::ZERO, Quat::IDENTITY, 1.0, 0, None, None);
    p.begin_despawn(ElementId(0), 1.0);
    p.dispose();
    assert!(p.tick(2.0).is_empty());
    assert_eq!(p.free_blocks(), 2);
}

#[test]
fn arc_phase_and_relay_land_in_attributes() {
    let mut p = pool(2, 1);
    p.spawn(ElementId(7), Vec3::ZERO, Quat::IDENTITY, 1.0, 1, Some(2.5), Some(3));
    let a = p.attributes()[0];
    assert_eq!(a.seed, 2.5);
    assert_eq!(a.relay_index, 3.0);
    assert_eq!(a.model_index, 1.0);
    assert_eq!(p.attribute_bytes().len(), p.capacity() * 48);
    assert_eq!(p.matrix_bytes().len(), p.capacity() * 64);
}

#[test]
fn unknown_ids_are_ignored() {
    let mut p = pool(1, 0);
    p.update_instance_transform(ElementId(9), Vec3::ONE, Quat::IDENTITY, 1.0);
    p.update_instance_opacity(ElementId(9), 1.0);
    assert!(!p.begin_despawn(ElementId(9), 0.1));
    assert!(!p.remove_immediate(ElementId(9)));
    check(&p);
}
