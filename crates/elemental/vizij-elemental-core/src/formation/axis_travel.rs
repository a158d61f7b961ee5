//! Axis travel: elements move along one axis between two landmarks while
//! their scale and ring diameter interpolate.

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
pub struct AxisTravelSpec {
    pub axis: Axis,
    pub start: Option<LandmarkRef>,
    pub end: Option<LandmarkRef>,
    pub easing: Easing,
    pub start_scale: f32,
    pub end_scale: f32,
    pub start_diameter: f32,
    pub end_diameter: f32,
    /// Extra roll applied to every element, degrees.
    pub arc_offset: f32,
    pub formation: Option<FormationShape>,
    pub orientation: Option<OrientationMode>,
    pub reverse_at: Option<f32>,
    pub hold_at: Option<f32>,
}

impl Default for AxisTravelSpec {
    fn default() -> Self {
        Self {
            axis: Axis::Y,
            start: None,
            end: None,
            easing: Easing::EaseInOutQuad,
            start_scale: 1.0,
            end_scale: 1.0,
            start_diameter: 1.0,
            end_diameter: 1.0,
            arc_offset: 0.0,
            formation: None,
            orientation: None,
            reverse_at: None,
            hold_at: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AxisTravelConfig {
    pub axis: Axis,
    pub start: f32,
    pub end: f32,
    pub easing: Easing,
    pub start_scale: f32,
    pub end_scale: f32,
    pub start_diameter: f32,
    pub end_diameter: f32,
    /// Radians.
    pub arc_offset: f32,
    pub shape: Option<FormationShape>,
    pub orientation: Option<OrientationMode>,
    pub window: ProgressWindow,
}

/// Missing start/end default to the bottom and top of the mascot.
pub fn parse(spec: &AxisTravelSpec, resolver: &dyn LandmarkResolver) -> Result<AxisTravelConfig> {
    Ok(AxisTravelConfig {
        axis: spec.axis,
        start: resolve_opt(spec.start.as_ref(), resolver, -1.0),
        end: resolve_opt(spec.end.as_ref(), resolver, 1.0),
        easing: spec.easing,
        start_scale: spec.start_scale,
        end_scale: spec.end_scale,
        start_diameter: spec.start_diameter,
        end_diameter: spec.end_diameter,
        arc_offset: spec.arc_offset.to_radians(),
        shape: spec.formation.clone(),
        orientation: spec.orientation,
        window: ProgressWindow::new(spec.reverse_at, spec.hold_at),
    })
}

pub fn expand(cfg: &AxisTravelConfig, count: usize) -> Vec<FormationOffset> {
    expand_shape(cfg.shape.as_ref(), count, cfg.axis)
}

pub fn calculate_axis_travel_position(
    cfg: &AxisTravelConfig,
    offset: &FormationOffset,
    progress: f32,
    mascot_radius: f32,
) -> Placement {
    let p = cfg.window.apply(stagger(progress, offset.progress_offset));
    let e = cfg.easing.apply(p);
    let along = lerp(cfg.start, cfg.end, e);
    let local = cfg.axis.unit() * along + offset.position;
    let diameter = lerp(cfg.start_diameter, cfg.end_diameter, e);
    Placement {
        position: local * mascot_radius,
        scale: lerp(cfg.start_scale, cfg.end_scale, e) * diameter * offset.scale,
        facing: Some(cfg.axis.unit()),
        arc_rotation: offset.rotation + cfg.arc_offset,
    }
}
