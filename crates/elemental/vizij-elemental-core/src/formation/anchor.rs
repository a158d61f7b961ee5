//! Anchor: elements stay at a landmark, bobbing gently while they scale in.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::progress::{stagger, ProgressWindow};
use super::shape::{expand_shape, Axis, FormationOffset, FormationShape};
use super::Placement;
use crate::easing::{lerp, Easing};
use crate::error::Result;
use crate::landmark::{resolve_opt, LandmarkRef, LandmarkResolver};
use crate::sizing::OrientationMode;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnchorSpec {
    pub landmark: Option<LandmarkRef>,
    /// Offset from the landmark in mascot radii.
    pub offset: Vec3,
    pub bob_amplitude: f32,
    /// Bob cycles per second.
    pub bob_frequency: f32,
    pub start_scale: f32,
    pub end_scale: f32,
    pub easing: Easing,
    pub formation: Option<FormationShape>,
    pub orientation: Option<OrientationMode>,
    pub reverse_at: Option<f32>,
    pub hold_at: Option<f32>,
}

impl Default for AnchorSpec {
    fn default() -> Self {
        Self {
            landmark: None,
            offset: Vec3::ZERO,
            bob_amplitude: 0.0,
            bob_frequency: 0.5,
            start_scale: 1.0,
            end_scale: 1.0,
            easing: Easing::EaseOutBack,
            formation: None,
            orientation: None,
            reverse_at: None,
            hold_at: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnchorConfig {
    pub anchor: Vec3,
    pub bob_amplitude: f32,
    pub bob_frequency: f32,
    pub start_scale: f32,
    pub end_scale: f32,
    pub easing: Easing,
    pub shape: Option<FormationShape>,
    pub orientation: Option<OrientationMode>,
    pub window: ProgressWindow,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnchorSlot {
    pub offset: FormationOffset,
    pub bob_phase: f32,
}

pub fn parse(spec: &AnchorSpec, resolver: &dyn LandmarkResolver) -> Result<AnchorConfig> {
    let y = resolve_opt(spec.landmark.as_ref(), resolver, 0.0);
    Ok(AnchorConfig {
        anchor: Vec3::new(0.0, y, 0.0) + spec.offset,
        bob_amplitude: spec.bob_amplitude,
        bob_frequency: spec.bob_frequency,
        start_scale: spec.start_scale,
        end_scale: spec.end_scale,
        easing: spec.easing,
        shape: spec.formation.clone(),
        orientation: spec.orientation,
        window: ProgressWindow::new(spec.reverse_at, spec.hold_at),
    })
}

pub fn expand(cfg: &AnchorConfig, count: usize, rng: &mut StdRng) -> Vec<AnchorSlot> {
    expand_shape(cfg.shape.as_ref(), count, Axis::Y)
        .into_iter()
        .map(|offset| AnchorSlot {
            offset,
            bob_phase: if cfg.bob_amplitude != 0.0 {
                rng.gen_range(0.0..TAU)
            } else {
                0.0
            },
        })
        .collect()
}

pub fn calculate_anchor_position(
    cfg: &AnchorConfig,
    slot: &AnchorSlot,
    progress: f32,
    time: f32,
    mascot_radius: f32,
) -> Placement {
    let p = cfg.window.apply(stagger(progress, slot.offset.progress_offset));
    let e = cfg.easing.apply(p);
    let bob = (time * cfg.bob_frequency * TAU + slot.bob_phase).sin() * cfg.bob_amplitude;
    let local = cfg.anchor + slot.offset.position + Vec3::new(0.0, bob, 0.0);
    Placement {
        position: local * mascot_radius,
        scale: lerp(cfg.start_scale, cfg.end_scale, e) * slot.offset.scale,
        facing: Vec3::new(local.x, 0.0, local.z).try_normalize(),
        arc_rotation: slot.offset.rotation,
    }
}
