//! Orbit: elements circle the mascot's vertical axis on a (possibly tilted) ring.

use std::f32::consts::TAU;

use glam::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::progress::{stagger, ProgressWindow};
use super::shape::{expand_shape, Axis, FormationOffset, FormationShape};
use super::{Placement, Range};
use crate::easing::{lerp, Easing};
use crate::error::{ElementalError, Result};
use crate::landmark::{resolve_opt, LandmarkRef, LandmarkResolver};
use crate::sizing::OrientationMode;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrbitSpec {
    /// Ring radius in mascot radii, sampled per element.
    pub radius: Range,
    /// Radius multiplier reached at the end of the (eased) progress.
    pub radius_end_scale: f32,
    /// Height above the landmark in mascot radii, sampled per element.
    pub height: Range,
    pub landmark: Option<LandmarkRef>,
    /// Angular speed in radians per second.
    pub speed: f32,
    pub clockwise: bool,
    /// Ring tilt about X, degrees.
    pub tilt: f32,
    /// Uniform angular jitter, degrees.
    pub jitter: f32,
    pub start_scale: f32,
    pub end_scale: f32,
    pub easing: Easing,
    pub formation: Option<FormationShape>,
    pub orientation: Option<OrientationMode>,
    pub reverse_at: Option<f32>,
    pub hold_at: Option<f32>,
}

impl Default for OrbitSpec {
    fn default() -> Self {
        Self {
            radius: Range::fixed(1.3),
            radius_end_scale: 1.0,
            height: Range::fixed(0.0),
            landmark: None,
            speed: 1.0,
            clockwise: false,
            tilt: 0.0,
            jitter: 0.0,
            start_scale: 1.0,
            end_scale: 1.0,
            easing: Easing::Linear,
            formation: None,
            orientation: None,
            reverse_at: None,
            hold_at: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrbitConfig {
    pub radius: Range,
    pub radius_end_scale: f32,
    pub height: Range,
    pub center_y: f32,
    /// Signed radians per second.
    pub angular_velocity: f32,
    pub tilt: Quat,
    /// Radians.
    pub jitter: f32,
    pub start_scale: f32,
    pub end_scale: f32,
    pub easing: Easing,
    pub shape: Option<FormationShape>,
    pub orientation: Option<OrientationMode>,
    pub window: ProgressWindow,
}

/// Per-element orbit data: where on the ring the element starts.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitSlot {
    pub offset: FormationOffset,
    pub base_angle: f32,
    pub radius: f32,
    pub height: f32,
}

pub fn parse(spec: &OrbitSpec, resolver: &dyn LandmarkResolver) -> Result<OrbitConfig> {
    if spec.radius.min < 0.0 {
        return Err(ElementalError::InvalidConfig {
            field: "orbit.radius",
            reason: format!("negative radius {}", spec.radius.min),
        });
    }
    let sign = if spec.clockwise { -1.0 } else { 1.0 };
    Ok(OrbitConfig {
        radius: spec.radius,
        radius_end_scale: spec.radius_end_scale,
        height: spec.height,
        center_y: resolve_opt(spec.landmark.as_ref(), resolver, 0.0),
        angular_velocity: spec.speed * sign,
        tilt: Quat::from_rotation_x(spec.tilt.to_radians()),
        jitter: spec.jitter.abs().to_radians(),
        start_scale: spec.start_scale,
        end_scale: spec.end_scale,
        easing: spec.easing,
        shape: spec.formation.clone(),
        orientation: spec.orientation,
        window: ProgressWindow::new(spec.reverse_at, spec.hold_at),
    })
}

pub fn expand(cfg: &OrbitConfig, count: usize, rng: &mut StdRng) -> Vec<OrbitSlot> {
    let shaped = cfg.shape.as_ref().is_some_and(FormationShape::assigns_rotation);
    expand_shape(cfg.shape.as_ref(), count, Axis::Y)
        .into_iter()
        .enumerate()
        .map(|(i, offset)| {
            let even = i as f32 * TAU / count as f32;
            let jitter = if cfg.jitter > 0.0 {
                rng.gen_range(-cfg.jitter..=cfg.jitter)
            } else {
                0.0
            };
            let base = if shaped { offset.rotation } else { even };
            OrbitSlot {
                offset,
                base_angle: base + jitter,
                radius: cfg.radius.sample(rng),
                height: cfg.height.sample(rng),
            }
        })
        .collect()
}

pub fn calculate_orbit_position(
    cfg: &OrbitConfig,
    slot: &OrbitSlot,
    progress: f32,
    time: f32,
    mascot_radius: f32,
) -> Placement {
    let p = cfg.window.apply(stagger(progress, slot.offset.progress_offset));
    let e = cfg.easing.apply(p);
    let angle = slot.base_angle + cfg.angular_velocity * time;
    let r = slot.radius * lerp(1.0, cfg.radius_end_scale, e);
    let (sin, cos) = angle.sin_cos();
    let ring = cfg.tilt * Vec3::new(cos * r, 0.0, sin * r);
    let local = ring + Vec3::new(0.0, cfg.center_y + slot.height, 0.0) + slot.offset.position;
    Placement {
        position: local * mascot_radius,
        scale: lerp(cfg.start_scale, cfg.end_scale, e) * slot.offset.scale,
        facing: Some(cfg.tilt * Vec3::new(cos, 0.0, sin)),
        arc_rotation: slot.offset.rotation,
    }
}
