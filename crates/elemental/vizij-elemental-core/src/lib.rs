//! Vizij Elemental Core (engine-agnostic)
//!
//! Ambient elemental effects around a mascot: bounded pools of instanced
//! copies, formation placement (orbit, axis travel, anchor, radial burst,
//! surface scatter) and a per-element enter/hold/exit lifecycle.
//!
//! Adapters (Bevy/WASM) feed the mascot and camera transforms, call
//! `Spawner::update` once per frame and upload each pool's instance buffers.

pub mod animation;
pub mod config;
pub mod easing;
pub mod error;
pub mod formation;
pub mod geometry;
pub mod ids;
pub mod landmark;
pub mod outputs;
pub mod pool;
pub mod sizing;
pub mod spawner;

// Re-exports for consumers (adapters)
pub use animation::{AnimationConfig, AnimationState, Phase};
pub use config::{PoolSizing, SpawnerConfig};
pub use easing::Easing;
pub use error::{ElementalError, Result};
pub use formation::{
    calculate_axis_travel_position, calculate_orbit_position, sample_surface_points, Formation,
    FormationOffset, FormationRef, FormationShape, FormationSlot, FormationSpec, Placement,
    SurfacePoint,
};
pub use geometry::{
    GeometryLoad, GeometryProvider, GeometrySet, GeometryVariant, MaterialHandle, MergedGeometry,
    StaticGeometryProvider,
};
pub use ids::ElementId;
pub use landmark::{LandmarkRef, LandmarkResolver, LandmarkTable};
pub use outputs::SpawnerEvent;
pub use pool::{InstanceAttributes, InstancePool, PoolRenderState, PoolStats};
pub use sizing::{ModelProfile, OrientationMode, ScaleClass};
pub use spawner::{
    CameraFrame, ContainerTransform, LayerSpec, MascotFrame, ModeSpec, PoolStatus, SpawnOptions,
    Spawner, SpawnerStats,
};

pub use glam;
