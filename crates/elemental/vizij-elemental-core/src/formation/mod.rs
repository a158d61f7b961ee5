//! Formation math: raw configuration → resolved configuration → per-element
//! slots → per-frame placement.
//!
//! Every mode exposes the same three steps:
//! - `parse`: resolve landmark names and defaults (`*Spec` → `*Config`)
//! - `expand`: one slot per element (formation offset plus mode-specific data)
//! - `position`: slot + progress + time + mascot radius → [`Placement`]
//!
//! Outputs are in mascot-radius units multiplied by the mascot's bounding
//! radius; the spawner's container transform carries world position/scale.

pub mod anchor;
pub mod axis_travel;
pub mod orbit;
pub mod progress;
pub mod radial_burst;
pub mod shape;
pub mod surface;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ElementalError, Result};
use crate::landmark::LandmarkResolver;
use crate::sizing::OrientationMode;

pub use anchor::{AnchorConfig, AnchorSlot, AnchorSpec};
pub use axis_travel::{calculate_axis_travel_position, AxisTravelConfig, AxisTravelSpec};
pub use orbit::{calculate_orbit_position, OrbitConfig, OrbitSlot, OrbitSpec};
pub use progress::{stagger, ProgressWindow};
pub use radial_burst::{BurstSlot, RadialBurstConfig, RadialBurstSpec};
pub use shape::{expand_shape, Axis, FormationOffset, FormationShape};
pub use surface::{
    sample_surface_points, SurfaceConfig, SurfacePattern, SurfacePoint, SurfaceSampling,
    SurfaceSlot, SurfaceSpec,
};

/// Closed interval, given in JSON as a number or `{ "min": a, "max": b }`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RangeRepr")]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RangeRepr {
    Fixed(f32),
    Bounds { min: f32, max: f32 },
}

impl From<RangeRepr> for Range {
    fn from(r: RangeRepr) -> Self {
        match r {
            RangeRepr::Fixed(v) => Range::fixed(v),
            RangeRepr::Bounds { min, max } => Range::new(min, max),
        }
    }
}

impl Range {
    /// Bounds given in either order.
    pub fn new(a: f32, b: f32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub const fn fixed(v: f32) -> Self {
        Self { min: v, max: v }
    }

    pub fn sample(&self, rng: &mut StdRng) -> f32 {
        if self.max - self.min <= f32::EPSILON {
            self.min
        } else {
            rng.gen_range(self.min..self.max)
        }
    }
}

/// Concrete per-frame output of a formation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    pub scale: f32,
    /// Direction hint used by radial/velocity-less orientation modes.
    pub facing: Option<Vec3>,
    /// Roll about the billboard's forward axis (or yaw for upright/flat).
    pub arc_rotation: f32,
}

impl Placement {
    pub fn hidden() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: 0.0,
            facing: None,
            arc_rotation: 0.0,
        }
    }
}

/// Inputs to `expand` beyond the configuration itself.
pub struct ExpandContext<'a> {
    pub rng: &'a mut StdRng,
    /// Candidate points on the mascot, mascot-local and radius-normalized.
    pub surface: &'a [SurfacePoint],
    /// Unit direction from the mascot toward the camera.
    pub view_dir: Vec3,
}

/// Raw formation configuration, tagged by `type`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FormationSpec {
    #[serde(rename = "orbit")]
    Orbit(OrbitSpec),
    #[serde(rename = "axis-travel", alias = "axisTravel")]
    AxisTravel(AxisTravelSpec),
    #[serde(rename = "anchor")]
    Anchor(AnchorSpec),
    #[serde(rename = "radial-burst", alias = "radialBurst", alias = "burst")]
    RadialBurst(RadialBurstSpec),
    #[serde(rename = "surface")]
    Surface(SurfaceSpec),
}

impl FormationSpec {
    /// Default configuration for a mode named by string shorthand.
    pub fn from_shorthand(name: &str) -> Result<Self> {
        Ok(match name {
            "orbit" => FormationSpec::Orbit(OrbitSpec::default()),
            "axis-travel" | "axisTravel" => FormationSpec::AxisTravel(AxisTravelSpec::default()),
            "anchor" => FormationSpec::Anchor(AnchorSpec::default()),
            "radial-burst" | "radialBurst" | "burst" => {
                FormationSpec::RadialBurst(RadialBurstSpec::default())
            }
            "surface" => FormationSpec::Surface(SurfaceSpec::default()),
            other => return Err(ElementalError::UnknownFormation(other.to_string())),
        })
    }
}

/// A formation given as shorthand name or full spec.
///
/// Anything else is kept raw so one bad layer fails alone in `to_spec`
/// instead of rejecting the whole spawn document.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormationRef {
    Named(String),
    Spec(FormationSpec),
    Unrecognized(serde_json::Value),
}

impl FormationRef {
    pub fn to_spec(&self) -> Result<FormationSpec> {
        match self {
            FormationRef::Named(name) => FormationSpec::from_shorthand(name),
            FormationRef::Spec(spec) => Ok(spec.clone()),
            FormationRef::Unrecognized(raw) => {
                let ty = raw.get("type").and_then(|t| t.as_str());
                match ty {
                    Some(ty) if FormationSpec::from_shorthand(ty).is_ok() => {
                        // known type with invalid fields: surface the serde message
                        Ok(serde_json::from_value(raw.clone())?)
                    }
                    Some(ty) => Err(ElementalError::UnknownFormation(ty.to_string())),
                    None => Err(ElementalError::UnknownFormation(raw.to_string())),
                }
            }
        }
    }
}

impl Default for FormationRef {
    fn default() -> Self {
        FormationRef::Spec(FormationSpec::Orbit(OrbitSpec::default()))
    }
}

/// Resolved, immutable formation configuration.
#[derive(Clone, Debug, PartialEq)]
pub enum Formation {
    Orbit(OrbitConfig),
    AxisTravel(AxisTravelConfig),
    Anchor(AnchorConfig),
    RadialBurst(RadialBurstConfig),
    Surface(SurfaceConfig),
}

/// Formation-specific data carried by each active element.
#[derive(Clone, Debug, PartialEq)]
pub enum FormationSlot {
    Orbit(OrbitSlot),
    AxisTravel(FormationOffset),
    Anchor(AnchorSlot),
    RadialBurst(BurstSlot),
    Surface(SurfaceSlot),
}

impl FormationSlot {
    pub fn offset(&self) -> &FormationOffset {
        match self {
            FormationSlot::Orbit(s) => &s.offset,
            FormationSlot::AxisTravel(o) => o,
            FormationSlot::Anchor(s) => &s.offset,
            FormationSlot::RadialBurst(s) => &s.offset,
            FormationSlot::Surface(s) => &s.offset,
        }
    }
}

impl Formation {
    pub fn parse(spec: &FormationSpec, resolver: &dyn LandmarkResolver) -> Result<Self> {
        Ok(match spec {
            FormationSpec::Orbit(s) => Formation::Orbit(orbit::parse(s, resolver)?),
            FormationSpec::AxisTravel(s) => Formation::AxisTravel(axis_travel::parse(s, resolver)?),
            FormationSpec::Anchor(s) => Formation::Anchor(anchor::parse(s, resolver)?),
            FormationSpec::RadialBurst(s) => {
                Formation::RadialBurst(radial_burst::parse(s, resolver)?)
            }
            FormationSpec::Surface(s) => Formation::Surface(surface::parse(s)?),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Formation::Orbit(_) => "orbit",
            Formation::AxisTravel(_) => "axis-travel",
            Formation::Anchor(_) => "anchor",
            Formation::RadialBurst(_) => "radial-burst",
            Formation::Surface(_) => "surface",
        }
    }

    /// Orientation forced by the configuration, overriding the model table.
    pub fn orientation(&self) -> Option<OrientationMode> {
        match self {
            Formation::Orbit(c) => c.orientation,
            Formation::AxisTravel(c) => c.orientation,
            Formation::Anchor(c) => c.orientation,
            Formation::RadialBurst(c) => c.orientation,
            Formation::Surface(c) => c.orientation,
        }
    }

    /// One slot per element; may be shorter than `count` only for surface
    /// sampling over too few candidates.
    pub fn expand(&self, count: usize, ctx: &mut ExpandContext<'_>) -> Vec<FormationSlot> {
        match self {
            Formation::Orbit(c) => orbit::expand(c, count, ctx.rng)
                .into_iter()
                .map(FormationSlot::Orbit)
                .collect(),
            Formation::AxisTravel(c) => axis_travel::expand(c, count)
                .into_iter()
                .map(FormationSlot::AxisTravel)
                .collect(),
            Formation::Anchor(c) => anchor::expand(c, count, ctx.rng)
                .into_iter()
                .map(FormationSlot::Anchor)
                .collect(),
            Formation::RadialBurst(c) => radial_burst::expand(c, count)
                .into_iter()
                .map(FormationSlot::RadialBurst)
                .collect(),
            Formation::Surface(c) => surface::expand(c, count, ctx)
                .into_iter()
                .map(FormationSlot::Surface)
                .collect(),
        }
    }

    /// Placement at `progress` (0..1) and `time` seconds since spawn.
    pub fn position(
        &self,
        slot: &FormationSlot,
        progress: f32,
        time: f32,
        mascot_radius: f32,
    ) -> Placement {
        match (self, slot) {
            (Formation::Orbit(c), FormationSlot::Orbit(s)) => {
                calculate_orbit_position(c, s, progress, time, mascot_radius)
            }
            (Formation::AxisTravel(c), FormationSlot::AxisTravel(o)) => {
                calculate_axis_travel_position(c, o, progress, mascot_radius)
            }
            (Formation::Anchor(c), FormationSlot::Anchor(s)) => {
                anchor::calculate_anchor_position(c, s, progress, time, mascot_radius)
            }
            (Formation::RadialBurst(c), FormationSlot::RadialBurst(s)) => {
                radial_burst::calculate_burst_position(c, s, progress, mascot_radius)
            }
            (Formation::Surface(c), FormationSlot::Surface(s)) => {
                surface::calculate_surface_position(c, s, progress, mascot_radius)
            }
            _ => {
                log::trace!("slot does not belong to {} formation", self.kind());
                Placement::hidden()
            }
        }
    }
}
