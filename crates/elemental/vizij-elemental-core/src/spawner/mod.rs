//! Spawner: owns one instance pool per element type, expands spawn requests
//! through the formation modules and drives every active element per frame.
//!
//! Methods:
//! - new, initialize_pool, spawn, despawn, despawn_all, trigger_exit
//! - update (pool clocks → gesture progress → formation placement → animation → pool writes)
//! - has_elements, stats, dispose

pub mod element;
pub mod options;
pub mod orientation;

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use hashbrown::{HashMap, HashSet};
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::animation::AnimationState;
use crate::config::SpawnerConfig;
use crate::formation::{ExpandContext, Formation, SurfacePoint};
use crate::geometry::{GeometryLoad, GeometryProvider, GeometrySet, MergedGeometry};
use crate::ids::{ElementId, IdAllocator};
use crate::landmark::LandmarkTable;
use crate::outputs::SpawnerEvent;
use crate::pool::{InstancePool, PoolStats};
use crate::sizing::profile_or_default;

pub use element::{ActiveElement, GestureClock};
pub use options::{LayerSpec, ModeSpec, SpawnOptions};
pub use orientation::{push_toward_camera, resolve_rotation, OrientationContext};

/// Mascot reference: world transform plus unscaled bounding radius.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MascotFrame {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub bounding_radius: f32,
}

impl Default for MascotFrame {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            bounding_radius: 1.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraFrame {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for CameraFrame {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            rotation: Quat::IDENTITY,
        }
    }
}

/// Shared transform of every pool's instances; follows the mascot.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for ContainerTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl ContainerTransform {
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// World point → container-local point.
    pub fn to_local(&self, world: Vec3) -> Vec3 {
        let scale = self.scale.max(Vec3::splat(f32::EPSILON));
        (self.rotation.inverse() * (world - self.translation)) / scale
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolStatus {
    Ready,
    Pending,
    Unavailable,
}

#[derive(Debug)]
pub enum PoolEntry {
    Ready(InstancePool),
    /// Geometry failed to load; spawns for the type are no-ops.
    Unavailable,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnerStats {
    pub active_elements: usize,
    pub pools: Vec<PoolStats>,
}

pub struct Spawner<G: GeometryProvider> {
    cfg: SpawnerConfig,
    provider: G,
    landmarks: LandmarkTable,
    ids: IdAllocator,
    rng: StdRng,

    pools: HashMap<String, PoolEntry>,
    pending: HashSet<String>,
    deferred: HashMap<String, SpawnOptions>,
    elements: IndexMap<ElementId, ActiveElement>,
    clocks: HashMap<String, GestureClock>,

    mascot: MascotFrame,
    camera: CameraFrame,
    surface: Vec<SurfacePoint>,
    container: ContainerTransform,
    time: f32,

    queued: Vec<SpawnerEvent>,
    events: Vec<SpawnerEvent>,
}

impl<G: GeometryProvider> Spawner<G> {
    pub fn new(cfg: SpawnerConfig, provider: G) -> Self {
        let rng = StdRng::seed_from_u64(cfg.seed);
        Self {
            cfg,
            provider,
            landmarks: LandmarkTable::default(),
            ids: IdAllocator::new(),
            rng,
            pools: HashMap::new(),
            pending: HashSet::new(),
            deferred: HashMap::new(),
            elements: IndexMap::new(),
            clocks: HashMap::new(),
            mascot: MascotFrame::default(),
            camera: CameraFrame::default(),
            surface: Vec::new(),
            container: ContainerTransform::default(),
            time: 0.0,
            queued: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &SpawnerConfig {
        &self.cfg
    }

    pub fn provider(&self) -> &G {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut G {
        &mut self.provider
    }

    pub fn landmarks(&self) -> &LandmarkTable {
        &self.landmarks
    }

    pub fn landmarks_mut(&mut self) -> &mut LandmarkTable {
        &mut self.landmarks
    }

    pub fn set_mascot(&mut self, mascot: MascotFrame) {
        self.mascot = mascot;
    }

    pub fn mascot(&self) -> &MascotFrame {
        &self.mascot
    }

    pub fn set_camera(&mut self, camera: CameraFrame) {
        self.camera = camera;
    }

    /// Candidate points for surface formations, mascot-local and radius-normalized.
    pub fn set_mascot_surface(&mut self, points: Vec<SurfacePoint>) {
        self.surface = points;
    }

    pub fn container(&self) -> &ContainerTransform {
        &self.container
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn pool(&self, element_type: &str) -> Option<&InstancePool> {
        match self.pools.get(element_type) {
            Some(PoolEntry::Ready(pool)) => Some(pool),
            _ => None,
        }
    }

    /// Ready pools in type order.
    pub fn pools(&self) -> Vec<&InstancePool> {
        let mut out: Vec<&InstancePool> = self
            .pools
            .values()
            .filter_map(|e| match e {
                PoolEntry::Ready(p) => Some(p),
                PoolEntry::Unavailable => None,
            })
            .collect();
        out.sort_by(|a, b| a.element_type().cmp(b.element_type()));
        out
    }

    pub fn element(&self, id: ElementId) -> Option<&ActiveElement> {
        self.elements.get(&id)
    }

    /// Active elements in spawn order.
    pub fn elements(&self) -> impl Iterator<Item = &ActiveElement> {
        self.elements.values()
    }

    pub fn status(&self, element_type: &str) -> Option<PoolStatus> {
        match self.pools.get(element_type) {
            Some(PoolEntry::Ready(_)) => Some(PoolStatus::Ready),
            Some(PoolEntry::Unavailable) => Some(PoolStatus::Unavailable),
            None if self.pending.contains(element_type) => Some(PoolStatus::Pending),
            None => None,
        }
    }

    /// Idempotent. While a load is in flight, repeated calls share it.
    pub fn initialize_pool(&mut self, element_type: &str) -> PoolStatus {
        if let Some(status) = self.status(element_type) {
            return status;
        }
        self.pending.insert(element_type.to_string());
        let load = self.provider.request(element_type);
        self.settle(element_type, load)
    }

    fn settle(&mut self, element_type: &str, load: GeometryLoad) -> PoolStatus {
        match load {
            GeometryLoad::Pending => PoolStatus::Pending,
            GeometryLoad::Ready(set) => {
                self.pending.remove(element_type);
                match set.and_then(|s| self.build_pool(element_type, s)) {
                    Some(pool) => {
                        log::debug!(
                            "{element_type} pool ready: {} elements x {} slots",
                            pool.max_elements(),
                            pool.slots_per_element()
                        );
                        self.queued.push(SpawnerEvent::PoolReady {
                            element_type: element_type.to_string(),
                            capacity: pool.capacity(),
                        });
                        self.pools
                            .insert(element_type.to_string(), PoolEntry::Ready(pool));
                        PoolStatus::Ready
                    }
                    None => {
                        log::warn!("{element_type} geometry unavailable; spawns will be skipped");
                        self.deferred.remove(element_type);
                        self.queued.push(SpawnerEvent::PoolUnavailable {
                            element_type: element_type.to_string(),
                        });
                        self.pools
                            .insert(element_type.to_string(), PoolEntry::Unavailable);
                        PoolStatus::Unavailable
                    }
                }
            }
        }
    }

    fn build_pool(&self, element_type: &str, set: GeometrySet) -> Option<InstancePool> {
        let merged = MergedGeometry::merge(&set.variants)?;
        Some(InstancePool::new(
            element_type,
            self.cfg.sizing_for(element_type),
            self.cfg.trail_spacing,
            merged,
            set.material,
        ))
    }

    /// Replace the type's active batch with a new one. Returns the spawned ids,
    /// possibly fewer than requested; empty while the pool is not ready.
    pub fn spawn(&mut self, element_type: &str, options: SpawnOptions) -> Vec<ElementId> {
        match self.initialize_pool(element_type) {
            PoolStatus::Ready => {}
            PoolStatus::Pending => {
                log::debug!("{element_type} pool loading; spawn deferred");
                self.deferred.insert(element_type.to_string(), options);
                return Vec::new();
            }
            PoolStatus::Unavailable => {
                log::warn!("{element_type} pool unavailable; spawn skipped");
                return Vec::new();
            }
        }

        self.remove_type(element_type);
        self.deferred.remove(element_type);

        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(self.rng.gen()),
        };
        // surface candidates are mascot-local, so the view direction must be too
        let view_dir = self
            .container_for_mascot(self.mascot.rotation)
            .to_local(self.camera.position)
            .try_normalize()
            .unwrap_or(Vec3::Z);

        let Some(PoolEntry::Ready(pool)) = self.pools.get_mut(element_type) else {
            return Vec::new();
        };
        pool.render_state_mut().reset();

        let layers = options.layers();
        let mut spawned = Vec::new();
        for (layer_index, layer) in layers.iter().enumerate() {
            let count = layer.count.unwrap_or(options.count);
            let formation = match layer
                .mode
                .to_spec()
                .and_then(|spec| Formation::parse(&spec, &self.landmarks))
            {
                Ok(f) => Arc::new(f),
                Err(err) => {
                    log::warn!("{element_type} layer {layer_index} skipped: {err}");
                    continue;
                }
            };
            let available = pool.free_blocks();
            if count > available {
                log::warn!(
                    "{element_type} pool has room for {available} of {count} requested elements"
                );
            }
            let count = count.min(available);
            if count == 0 {
                continue;
            }

            let names = layer.models.as_ref().unwrap_or(&options.models);
            let models = resolve_models(element_type, names, pool.geometry());
            if models.is_empty() {
                continue;
            }

            let mut ctx = ExpandContext {
                rng: &mut rng,
                surface: &self.surface,
                view_dir,
            };
            let slots = formation.expand(count, &mut ctx);
            let animation = layer.animation.as_ref().or(options.animation.as_ref());

            for (i, slot) in slots.into_iter().enumerate() {
                let (model_index, model) = models[i % models.len()].clone();
                let profile = profile_or_default(&model);
                let orientation = formation.orientation().unwrap_or(profile.orientation);
                let placement =
                    formation.position(&slot, 0.0, 0.0, self.mascot.bounding_radius);
                let arc_phase = profile.ring.then(|| slot.offset().rotation);
                let relay = layer.relay.then_some(i as u32);
                let id = self.ids.alloc_element();
                let scale = placement.scale * profile.scale_class.multiplier();
                if !pool.spawn(
                    id,
                    placement.position,
                    Quat::IDENTITY,
                    scale,
                    model_index,
                    arc_phase,
                    relay,
                ) {
                    break;
                }
                self.elements.insert(
                    id,
                    ActiveElement {
                        id,
                        element_type: element_type.to_string(),
                        model,
                        model_index,
                        layer: layer_index,
                        spawn_time: self.time,
                        formation: Arc::clone(&formation),
                        slot,
                        orientation,
                        scale_class: profile.scale_class.multiplier(),
                        position: placement.position,
                        rotation: Quat::IDENTITY,
                        scale,
                        opacity: 0.0,
                        heading: Vec3::Y,
                        animation: animation
                            .cloned()
                            .map(|cfg| AnimationState::new(cfg, i)),
                        fade_from: None,
                    },
                );
                spawned.push(id);
            }
        }

        let render_order = layers.iter().find_map(|l| l.render_order);
        let depth_write = layers.iter().find_map(|l| l.depth_write);
        let state = pool.render_state_mut();
        if let Some(order) = render_order {
            state.render_order = order;
        }
        if let Some(depth) = depth_write {
            state.depth_write = depth;
        }

        let duration = options
            .gesture_duration
            .unwrap_or(self.cfg.default_gesture_duration);
        self.clocks
            .insert(element_type.to_string(), GestureClock::new(duration));
        log::debug!(
            "{element_type}: spawned {} elements over {} layer(s)",
            spawned.len(),
            layers.len()
        );
        spawned
    }

    /// Fade out (`animated`) or drop at once every element of a type, or of all types.
    pub fn despawn(&mut self, element_type: Option<&str>, animated: bool) {
        if let Some(ty) = element_type {
            self.deferred.remove(ty);
        } else {
            self.deferred.clear();
        }
        if !animated {
            match element_type {
                Some(ty) => self.remove_type(ty),
                None => self.remove_all(),
            }
            return;
        }
        let fade = self.cfg.despawn_fade;
        for el in self.elements.values_mut() {
            if element_type.is_some_and(|ty| ty != el.element_type) {
                continue;
            }
            if let Some(PoolEntry::Ready(pool)) = self.pools.get_mut(&el.element_type) {
                if pool.begin_despawn(el.id, fade) {
                    el.fade_from = Some(el.opacity);
                }
            }
        }
        log::debug!("despawn {:?} over {fade}s", element_type.unwrap_or("*"));
    }

    /// Immediate removal of everything; used at shutdown.
    pub fn despawn_all(&mut self) {
        self.despawn(None, false);
    }

    /// Start the exit phase; elements without an animation fall back to the pool fade.
    pub fn trigger_exit(&mut self, element_type: Option<&str>) {
        let fade = self.cfg.despawn_fade;
        for el in self.elements.values_mut() {
            if element_type.is_some_and(|ty| ty != el.element_type) {
                continue;
            }
            match el.animation.as_mut() {
                Some(anim) => anim.trigger_exit(),
                None => {
                    if let Some(PoolEntry::Ready(pool)) = self.pools.get_mut(&el.element_type) {
                        if pool.begin_despawn(el.id, fade) {
                            el.fade_from = Some(el.opacity);
                        }
                    }
                }
            }
        }
    }

    pub fn has_elements(&self, element_type: &str) -> bool {
        self.elements
            .values()
            .any(|el| el.element_type == element_type)
    }

    pub fn stats(&self) -> SpawnerStats {
        SpawnerStats {
            active_elements: self.elements.len(),
            pools: self.pools().into_iter().map(InstancePool::stats).collect(),
        }
    }

    /// Events produced by the last `update`.
    pub fn events(&self) -> &[SpawnerEvent] {
        &self.events
    }

    /// Per-frame tick. `gesture_progress` is the host's 0..1 signal, if any.
    pub fn update(&mut self, dt: f32, gesture_progress: Option<f32>) -> &[SpawnerEvent] {
        self.events.clear();
        self.poll_pending();
        self.events.append(&mut self.queued);

        let has_pool = self
            .pools
            .values()
            .any(|p| matches!(p, PoolEntry::Ready(_)));
        if !has_pool && self.elements.is_empty() {
            return &self.events;
        }

        let dt = dt.max(0.0);
        self.time += dt;

        let world_space = self
            .elements
            .values()
            .any(|el| el.orientation.needs_world_space());
        let rotation = if world_space {
            Quat::IDENTITY
        } else {
            self.mascot.rotation
        };
        self.container = self.container_for_mascot(rotation);

        for (ty, entry) in self.pools.iter_mut() {
            if let PoolEntry::Ready(pool) = entry {
                for id in pool.tick(dt) {
                    if self.elements.shift_remove(&id).is_some() {
                        self.events.push(SpawnerEvent::ElementRemoved {
                            element_type: ty.clone(),
                            id,
                        });
                    }
                }
            }
        }

        let mut progress: HashMap<String, f32> = HashMap::new();
        for (ty, clock) in self.clocks.iter_mut() {
            progress.insert(ty.clone(), clock.advance(dt, gesture_progress));
        }

        let radius = self.mascot.bounding_radius;
        let ctx = OrientationContext {
            camera_rotation: self.container.rotation.inverse() * self.camera.rotation,
            camera_position: self.container.to_local(self.camera.position),
            camera_push: self.cfg.camera_push * radius,
        };
        let now = self.time;
        let mut finished = Vec::new();

        for el in self.elements.values_mut() {
            let Some(PoolEntry::Ready(pool)) = self.pools.get_mut(&el.element_type) else {
                finished.push(el.id);
                continue;
            };
            let gp = progress.get(&el.element_type).copied().unwrap_or(1.0);
            let age = el.age(now);

            if let Some(anim) = el.animation.as_mut() {
                if !anim.update(age, dt, Some(gp)) {
                    finished.push(el.id);
                    continue;
                }
                if !anim.is_visible() {
                    pool.update_instance_opacity(el.id, 0.0);
                    continue;
                }
            }

            let p = el.formation_progress(gp);
            let placement = el.formation.position(&el.slot, p, age, radius);
            let velocity = if dt > 0.0 {
                (placement.position - el.position) / dt
            } else {
                Vec3::ZERO
            };
            let rotation =
                resolve_rotation(el.orientation, &placement, velocity, &ctx, &mut el.heading);
            let position = push_toward_camera(el.orientation, placement.position, &ctx);

            let (anim_opacity, anim_scale) = match &el.animation {
                Some(anim) => (anim.opacity(), anim.scale_factor()),
                None => (1.0, 1.0),
            };
            let opacity = match (el.fade_from, pool.block(el.id).and_then(|b| b.reclaim_in)) {
                (Some(from), Some(left)) if self.cfg.despawn_fade > 0.0 => {
                    from.min(anim_opacity) * (left / self.cfg.despawn_fade).clamp(0.0, 1.0)
                }
                (Some(_), _) => 0.0,
                _ => anim_opacity,
            };

            el.position = placement.position;
            el.rotation = rotation;
            el.scale = placement.scale * el.scale_class * anim_scale;
            if el.fade_from.is_none() {
                el.opacity = opacity;
            }
            pool.update_instance_transform(el.id, position, rotation, el.scale);
            pool.update_instance_opacity(el.id, opacity);
        }

        for id in finished {
            if let Some(el) = self.elements.shift_remove(&id) {
                if let Some(PoolEntry::Ready(pool)) = self.pools.get_mut(&el.element_type) {
                    pool.remove_immediate(id);
                }
                self.events.push(SpawnerEvent::ElementRemoved {
                    element_type: el.element_type,
                    id,
                });
            }
        }

        let live: HashSet<&str> = self
            .elements
            .values()
            .map(|el| el.element_type.as_str())
            .collect();
        self.clocks.retain(|ty, _| live.contains(ty.as_str()));

        &self.events
    }

    /// Drop every element and pool; pending loads and deferred spawns are forgotten.
    pub fn dispose(&mut self) {
        self.remove_all();
        for entry in self.pools.values_mut() {
            if let PoolEntry::Ready(pool) = entry {
                pool.dispose();
            }
        }
        self.pools.clear();
        self.pending.clear();
        self.deferred.clear();
        self.clocks.clear();
        self.queued.clear();
        self.events.clear();
        log::debug!("spawner disposed");
    }

    fn poll_pending(&mut self) {
        let mut waiting: Vec<String> = self.pending.iter().cloned().collect();
        waiting.sort();
        for ty in waiting {
            let load = self.provider.poll(&ty);
            if self.settle(&ty, load) != PoolStatus::Ready {
                continue;
            }
            if let Some(options) = self.deferred.remove(&ty) {
                let ids = self.spawn(&ty, options);
                self.queued.push(SpawnerEvent::Spawned {
                    element_type: ty,
                    ids,
                });
            }
        }
    }

    fn container_for_mascot(&self, rotation: Quat) -> ContainerTransform {
        ContainerTransform {
            translation: self.mascot.position,
            rotation,
            scale: self.mascot.scale,
        }
    }

    fn remove_type(&mut self, element_type: &str) {
        let ids: Vec<ElementId> = self
            .elements
            .values()
            .filter(|el| el.element_type == element_type)
            .map(|el| el.id)
            .collect();
        for id in ids {
            self.remove_element(id);
        }
        self.clocks.remove(element_type);
    }

    fn remove_all(&mut self) {
        let ids: Vec<ElementId> = self.elements.keys().copied().collect();
        for id in ids {
            self.remove_element(id);
        }
        self.clocks.clear();
    }

    fn remove_element(&mut self, id: ElementId) {
        if let Some(el) = self.elements.shift_remove(&id) {
            if let Some(PoolEntry::Ready(pool)) = self.pools.get_mut(&el.element_type) {
                pool.remove_immediate(id);
            }
            self.queued.push(SpawnerEvent::ElementRemoved {
                element_type: el.element_type,
                id,
            });
        }
    }
}

/// `(variant index, model name)` pairs for the requested names; unknown names
/// are skipped, and an empty request means every loaded variant.
fn resolve_models(
    element_type: &str,
    names: &[String],
    geometry: &MergedGeometry,
) -> Vec<(usize, String)> {
    if names.is_empty() {
        return geometry
            .variant_names
            .iter()
            .cloned()
            .enumerate()
            .collect();
    }
    let resolved: Vec<(usize, String)> = names
        .iter()
        .filter_map(|name| match geometry.variant_index(name) {
            Some(i) => Some((i, name.clone())),
            None => {
                log::warn!("{element_type}: unknown model '{name}' skipped");
                None
            }
        })
        .collect();
    if resolved.is_empty() {
        log::warn!("{element_type}: none of the requested models are loaded");
    }
    resolved
}
