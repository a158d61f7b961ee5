//! Instance slot pool: a fixed-capacity arena of GPU instance rows.
//!
//! Each element owns one contiguous block of `1 + trail_count` slots: the
//! main slot followed by its trail copies. Free blocks are tracked by main
//! slot index and the lowest free block is always handed out first, which
//! keeps the visible range (highest used slot + 1) short.
//!
//! Invariant: `free_blocks + tracked elements == max_elements` after every
//! public call. Elements fading out stay tracked until their countdown in
//! [`InstancePool::tick`] reaches zero.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::config::PoolSizing;
use crate::geometry::{MaterialHandle, MergedGeometry};
use crate::ids::ElementId;

/// Trails reach full length at this speed (mascot-local units per second).
const TRAIL_FULL_SPEED: f32 = 0.5;
const STATIONARY_SPEED: f32 = 1e-4;

/// Per-slot attribute row, uploaded as-is.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct InstanceAttributes {
    pub spawn_time: f32,
    /// 0 while not exiting.
    pub exit_time: f32,
    pub model_index: f32,
    pub opacity: f32,
    /// Main slot index for trail rows, -1 on the main row.
    pub trail_parent: f32,
    /// 0 on the main row, 1.. on trails.
    pub trail_index: f32,
    /// Random seed; ring visuals store their arc phase here instead.
    pub seed: f32,
    /// Position in a relay batch, -1 when not relayed.
    pub relay_index: f32,
    pub velocity: [f32; 3],
    pub speed: f32,
}

/// Transient per-pool material state, reset on every spawn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolRenderState {
    pub render_order: i32,
    pub depth_write: bool,
    pub uniforms: HashMap<String, f32>,
}

impl Default for PoolRenderState {
    fn default() -> Self {
        Self {
            render_order: 0,
            depth_write: false,
            uniforms: HashMap::new(),
        }
    }
}

impl PoolRenderState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Bookkeeping for one element's slot block.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotBlock {
    pub main: usize,
    pub last_position: Vec3,
    pub last_time: f32,
    pub velocity: Vec3,
    /// Seconds until the block is reclaimed; set by `begin_despawn`.
    pub reclaim_in: Option<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStats {
    pub element_type: String,
    pub capacity: usize,
    pub slots_per_element: usize,
    pub active_elements: usize,
    pub pending_reclaim: usize,
    pub free_blocks: usize,
    pub visible_count: usize,
}

#[derive(Debug)]
pub struct InstancePool {
    element_type: String,
    max_elements: usize,
    trail_count: usize,
    trail_spacing: f32,
    matrices: Vec<[f32; 16]>,
    attributes: Vec<InstanceAttributes>,
    /// Main slot indices, sorted descending so `pop` yields the lowest.
    free: Vec<usize>,
    blocks: HashMap<ElementId, SlotBlock>,
    time: f32,
    geometry: MergedGeometry,
    material: MaterialHandle,
    render_state: PoolRenderState,
}

fn hidden_matrix() -> [f32; 16] {
    Mat4::from_scale(Vec3::ZERO).to_cols_array()
}

/// Deterministic 0..1 seed from an element id.
fn id_seed(id: ElementId) -> f32 {
    let h = id.0.wrapping_add(1).wrapping_mul(0x9E37_79B9) >> 8;
    h as f32 / (1u32 << 24) as f32
}

impl InstancePool {
    pub fn new(
        element_type: impl Into<String>,
        sizing: PoolSizing,
        trail_spacing: f32,
        geometry: MergedGeometry,
        material: MaterialHandle,
    ) -> Self {
        let slots_per_element = 1 + sizing.trail_count;
        let capacity = sizing.max_elements * slots_per_element;
        Self {
            element_type: element_type.into(),
            max_elements: sizing.max_elements,
            trail_count: sizing.trail_count,
            trail_spacing: trail_spacing.max(0.0),
            matrices: vec![hidden_matrix(); capacity],
            attributes: vec![InstanceAttributes::default(); capacity],
            free: (0..sizing.max_elements)
                .rev()
                .map(|b| b * slots_per_element)
                .collect(),
            blocks: HashMap::new(),
            time: 0.0,
            geometry,
            material,
            render_state: PoolRenderState::default(),
        }
    }

    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    #[inline]
    pub fn slots_per_element(&self) -> usize {
        1 + self.trail_count
    }

    /// Total slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_elements * self.slots_per_element()
    }

    pub fn max_elements(&self) -> usize {
        self.max_elements
    }

    pub fn trail_count(&self) -> usize {
        self.trail_count
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn free_blocks(&self) -> usize {
        self.free.len()
    }

    pub fn free_slot_count(&self) -> usize {
        self.free.len() * self.slots_per_element()
    }

    pub fn active_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.blocks.contains_key(&id)
    }

    pub fn block(&self, id: ElementId) -> Option<&SlotBlock> {
        self.blocks.get(&id)
    }

    pub fn geometry(&self) -> &MergedGeometry {
        &self.geometry
    }

    pub fn material(&self) -> &MaterialHandle {
        &self.material
    }

    pub fn render_state(&self) -> &PoolRenderState {
        &self.render_state
    }

    pub fn render_state_mut(&mut self) -> &mut PoolRenderState {
        &mut self.render_state
    }

    /// Column-major transforms, one per slot.
    pub fn matrices(&self) -> &[[f32; 16]] {
        &self.matrices
    }

    pub fn attributes(&self) -> &[InstanceAttributes] {
        &self.attributes
    }

    pub fn matrix_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.matrices)
    }

    pub fn attribute_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.attributes)
    }

    /// Highest occupied slot + 1; only this prefix needs drawing.
    pub fn visible_count(&self) -> usize {
        let spe = self.slots_per_element();
        self.blocks
            .values()
            .map(|b| b.main + spe)
            .max()
            .unwrap_or(0)
    }

    /// Claim a block for `id`. Opacity starts at 0; the caller drives it.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        &mut self,
        id: ElementId,
        position: Vec3,
        rotation: Quat,
        scale: f32,
        model_index: usize,
        arc_phase: Option<f32>,
        relay_index: Option<u32>,
    ) -> bool {
        if self.blocks.contains_key(&id) {
            log::debug!("{} pool: {id} already has slots", self.element_type);
            return false;
        }
        let Some(main) = self.free.pop() else {
            log::warn!(
                "{} pool exhausted ({} elements), {id} not spawned",
                self.element_type,
                self.max_elements
            );
            return false;
        };
        let seed = arc_phase.unwrap_or_else(|| id_seed(id));
        let relay = relay_index.map(|r| r as f32).unwrap_or(-1.0);
        for k in 0..self.slots_per_element() {
            self.attributes[main + k] = InstanceAttributes {
                spawn_time: self.time,
                exit_time: 0.0,
                model_index: model_index as f32,
                opacity: 0.0,
                trail_parent: if k == 0 { -1.0 } else { main as f32 },
                trail_index: k as f32,
                seed,
                relay_index: relay,
                velocity: [0.0; 3],
                speed: 0.0,
            };
        }
        self.blocks.insert(
            id,
            SlotBlock {
                main,
                last_position: position,
                last_time: self.time,
                velocity: Vec3::ZERO,
                reclaim_in: None,
            },
        );
        self.write_transforms(main, position, rotation, scale, Vec3::ZERO);
        true
    }

    pub fn update_instance_transform(
        &mut self,
        id: ElementId,
        position: Vec3,
        rotation: Quat,
        scale: f32,
    ) {
        let Some(block) = self.blocks.get_mut(&id) else {
            return;
        };
        let dt = self.time - block.last_time;
        if dt > f32::EPSILON {
            block.velocity = (position - block.last_position) / dt;
            block.last_position = position;
            block.last_time = self.time;
        }
        let (main, velocity) = (block.main, block.velocity);
        let speed = velocity.length();
        let dir = velocity.normalize_or_zero();
        for slot in &mut self.attributes[main..main + 1 + self.trail_count] {
            slot.velocity = dir.to_array();
            slot.speed = speed;
        }
        self.write_transforms(main, position, rotation, scale, velocity);
    }

    /// Trails get 75/50/25% of the main opacity (for three trails).
    pub fn update_instance_opacity(&mut self, id: ElementId, opacity: f32) {
        let Some(main) = self.blocks.get(&id).map(|b| b.main) else {
            return;
        };
        let spe = self.slots_per_element() as f32;
        for k in 0..self.slots_per_element() {
            self.attributes[main + k].opacity = opacity * (1.0 - k as f32 / spe);
        }
    }

    /// Start the exit fade; slots are reclaimed by `tick` after `fade` seconds.
    /// Returns false if `id` is unknown or already fading.
    pub fn begin_despawn(&mut self, id: ElementId, fade: f32) -> bool {
        let Some(block) = self.blocks.get_mut(&id) else {
            return false;
        };
        if block.reclaim_in.is_some() {
            return false;
        }
        block.reclaim_in = Some(fade.max(0.0));
        let main = block.main;
        let exit = self.time.max(f32::MIN_POSITIVE);
        for slot in &mut self.attributes[main..main + 1 + self.trail_count] {
            slot.exit_time = exit;
        }
        true
    }

    /// Zero-scale and reclaim at once. Returns false if `id` is unknown.
    pub fn remove_immediate(&mut self, id: ElementId) -> bool {
        match self.blocks.remove(&id) {
            Some(block) => {
                self.release(block.main);
                true
            }
            None => false,
        }
    }

    /// Advance the pool clock and reclaim blocks whose fade has elapsed.
    pub fn tick(&mut self, dt: f32) -> Vec<ElementId> {
        self.time += dt.max(0.0);
        let mut due = Vec::new();
        for (id, block) in self.blocks.iter_mut() {
            if let Some(left) = block.reclaim_in.as_mut() {
                *left -= dt;
                if *left <= 0.0 {
                    due.push(*id);
                }
            }
        }
        due.sort();
        for id in &due {
            if let Some(block) = self.blocks.remove(id) {
                self.release(block.main);
            }
        }
        due
    }

    /// Reclaim everything, cancelling pending countdowns.
    pub fn dispose(&mut self) {
        let mains: Vec<usize> = self.blocks.drain().map(|(_, b)| b.main).collect();
        for main in mains {
            self.release(main);
        }
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            element_type: self.element_type.clone(),
            capacity: self.capacity(),
            slots_per_element: self.slots_per_element(),
            active_elements: self.blocks.len(),
            pending_reclaim: self.blocks.values().filter(|b| b.reclaim_in.is_some()).count(),
            free_blocks: self.free.len(),
            visible_count: self.visible_count(),
        }
    }

    fn release(&mut self, main: usize) {
        let spe = self.slots_per_element();
        for k in main..main + spe {
            self.matrices[k] = hidden_matrix();
            self.attributes[k] = InstanceAttributes::default();
        }
        let at = self.free.partition_point(|&m| m > main);
        self.free.insert(at, main);
    }

    fn write_transforms(&mut self, main: usize, position: Vec3, rotation: Quat, scale: f32, velocity: Vec3) {
        self.matrices[main] =
            Mat4::from_scale_rotation_translation(Vec3::splat(scale), rotation, position)
                .to_cols_array();
        let speed = velocity.length();
        let motion = if speed <= STATIONARY_SPEED {
            0.0
        } else {
            (speed / TRAIL_FULL_SPEED).min(1.0)
        };
        let spe = self.slots_per_element() as f32;
        for k in 1..=self.trail_count {
            let lag = velocity * self.trail_spacing * k as f32;
            let trail_scale = scale * motion * (1.0 - k as f32 / spe);
            self.matrices[main + k] = Mat4::from_scale_rotation_translation(
                Vec3::splat(trail_scale),
                rotation,
                position - lag,
            )
            .to_cols_array();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::quad_variant;

    fn pool(max_elements: usize, trail_count: usize) -> InstancePool {
        let geometry = MergedGeometry::merge(&[quad_variant("q")]).unwrap();
        InstancePool::new(
            "fire",
            PoolSizing {
                max_elements,
                trail_count,
            },
            0.05,
            geometry,
            MaterialHandle::default(),
        )
    }

    fn spawn(p: &mut InstancePool, n: u32) -> bool {
        p.spawn(ElementId(n), Vec3::ZERO, Quat::IDENTITY, 1.0, 0, None, None)
    }

    #[test]
    fn lowest_free_block_first() {
        let mut p = pool(3, 1);
        assert!(spawn(&mut p, 0));
        assert!(spawn(&mut p, 1));
        assert!(spawn(&mut p, 2));
        assert_eq!(p.visible_count(), 6);
        p.remove_immediate(ElementId(0));
        assert_eq!(p.visible_count(), 6);
        assert!(spawn(&mut p, 3));
        assert_eq!(p.block(ElementId(3)).unwrap().main, 0);
    }

    #[test]
    fn exhaustion_is_soft() {
        let mut p = pool(1, 0);
        assert!(spawn(&mut p, 0));
        assert!(!spawn(&mut p, 1));
        assert_eq!(p.active_count(), 1);
    }

    #[test]
    fn opacity_fans_out_to_trails() {
        let mut p = pool(2, 3);
        spawn(&mut p, 0);
        assert_eq!(p.attributes()[0].opacity, 0.0);
        p.update_instance_opacity(ElementId(0), 1.0);
        let o: Vec<f32> = p.attributes()[0..4].iter().map(|a| a.opacity).collect();
        assert_eq!(o, [1.0, 0.75, 0.5, 0.25]);
    }

    #[test]
    fn despawn_twice_is_noop_and_reclaims_after_fade() {
        let mut p = pool(2, 0);
        spawn(&mut p, 0);
        assert!(p.begin_despawn(ElementId(0), 0.5));
        assert!(!p.begin_despawn(ElementId(0), 0.5));
        assert!(p.tick(0.25).is_empty());
        assert_eq!(p.tick(0.3), vec![ElementId(0)]);
        assert_eq!(p.free_blocks(), 2);
    }

    #[test]
    fn stationary_trails_collapse() {
        let mut p = pool(1, 2);
        spawn(&mut p, 0);
        p.tick(0.1);
        p.update_instance_transform(ElementId(0), Vec3::ZERO, Quat::IDENTITY, 1.0);
        assert_eq!(p.matrices()[1][0], 0.0);
        p.tick(0.1);
        p.update_instance_transform(ElementId(0), Vec3::X, Quat::IDENTITY, 1.0);
        assert!(p.matrices()[1][0] > 0.0);
        assert!(p.attributes()[0].speed > 0.0);
    }
}
