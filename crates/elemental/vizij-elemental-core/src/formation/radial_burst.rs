//! Radial burst: elements fly outward from a landmark in lockstep.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::shape::FormationOffset;
use super::Placement;
use crate::easing::{lerp, Easing};
use crate::error::{ElementalError, Result};
use crate::landmark::{resolve_opt, LandmarkRef, LandmarkResolver};
use crate::sizing::OrientationMode;

/// π(3 − √5): successive Fibonacci-sphere points advance by this angle.
const GOLDEN_ANGLE: f32 = PI * (3.0 - 2.236_068);

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RadialBurstSpec {
    pub landmark: Option<LandmarkRef>,
    pub start_radius: f32,
    pub end_radius: f32,
    pub start_scale: f32,
    pub end_scale: f32,
    pub easing: Easing,
    /// Fibonacci-sphere directions instead of a horizontal ring.
    pub spherical: bool,
    /// Degrees.
    pub angle_offset: f32,
    pub orientation: Option<OrientationMode>,
}

impl Default for RadialBurstSpec {
    fn default() -> Self {
        Self {
            landmark: None,
            start_radius: 0.2,
            end_radius: 1.5,
            start_scale: 1.0,
            end_scale: 0.4,
            easing: Easing::EaseOutCubic,
            spherical: false,
            angle_offset: 0.0,
            orientation: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RadialBurstConfig {
    pub center_y: f32,
    pub start_radius: f32,
    pub end_radius: f32,
    pub start_scale: f32,
    pub end_scale: f32,
    pub easing: Easing,
    pub spherical: bool,
    /// Radians.
    pub angle_offset: f32,
    pub orientation: Option<OrientationMode>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BurstSlot {
    pub offset: FormationOffset,
    pub direction: Vec3,
}

pub fn parse(spec: &RadialBurstSpec, resolver: &dyn LandmarkResolver) -> Result<RadialBurstConfig> {
    if spec.start_radius < 0.0 || spec.end_radius < 0.0 {
        return Err(ElementalError::InvalidConfig {
            field: "radial-burst.radius",
            reason: format!("negative radius {}..{}", spec.start_radius, spec.end_radius),
        });
    }
    Ok(RadialBurstConfig {
        center_y: resolve_opt(spec.landmark.as_ref(), resolver, 0.0),
        start_radius: spec.start_radius,
        end_radius: spec.end_radius,
        start_scale: spec.start_scale,
        end_scale: spec.end_scale,
        easing: spec.easing,
        spherical: spec.spherical,
        angle_offset: spec.angle_offset.to_radians(),
        orientation: spec.orientation,
    })
}

/// Unit direction for element `i` of `count`.
pub fn burst_direction(cfg: &RadialBurstConfig, i: usize, count: usize) -> Vec3 {
    if cfg.spherical {
        let y = 1.0 - 2.0 * (i as f32 + 0.5) / count as f32;
        let ring = (1.0 - y * y).max(0.0).sqrt();
        let theta = i as f32 * GOLDEN_ANGLE + cfg.angle_offset;
        Vec3::new(theta.cos() * ring, y, theta.sin() * ring)
    } else {
        let angle = cfg.angle_offset + i as f32 * TAU / count as f32;
        Vec3::new(angle.cos(), 0.0, angle.sin())
    }
}

pub fn expand(cfg: &RadialBurstConfig, count: usize) -> Vec<BurstSlot> {
    (0..count)
        .map(|i| {
            let direction = burst_direction(cfg, i, count);
            BurstSlot {
                offset: FormationOffset {
                    rotation: direction.z.atan2(direction.x),
                    ..FormationOffset::default()
                },
                direction,
            }
        })
        .collect()
}

pub fn calculate_burst_position(
    cfg: &RadialBurstConfig,
    slot: &BurstSlot,
    progress: f32,
    mascot_radius: f32,
) -> Placement {
    let e = cfg.easing.apply(progress);
    let radius = lerp(cfg.start_radius, cfg.end_radius, e);
    let local = Vec3::new(0.0, cfg.center_y, 0.0) + slot.direction * radius;
    Placement {
        position: local * mascot_radius,
        scale: lerp(cfg.start_scale, cfg.end_scale, e) * slot.offset.scale,
        facing: Some(slot.direction),
        arc_rotation: slot.offset.rotation,
    }
}
