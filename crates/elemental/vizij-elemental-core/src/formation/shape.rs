//! Formation shapes: pure per-index offsets applied across a batch.
//!
//! Every shape is a function of `(index, count, parameters)` only, so a given
//! input always expands to the same offsets.

use std::f32::consts::TAU;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Cartesian axis used for travel and stacking.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    #[default]
    Y,
    Z,
}

impl Axis {
    #[inline]
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    /// Two unit vectors spanning the plane perpendicular to this axis.
    #[inline]
    pub fn plane(self) -> (Vec3, Vec3) {
        match self {
            Axis::X => (Vec3::Y, Vec3::Z),
            Axis::Y => (Vec3::X, Vec3::Z),
            Axis::Z => (Vec3::X, Vec3::Y),
        }
    }
}

/// Per-element result of expanding a formation.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormationOffset {
    pub position: Vec3,
    /// Radians; ring angle for orbits, arc roll for billboards.
    pub rotation: f32,
    /// Stagger in progress units, always below 1.
    pub progress_offset: f32,
    pub scale: f32,
}

impl Default for FormationOffset {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: 0.0,
            progress_offset: 0.0,
            scale: 1.0,
        }
    }
}

fn default_spacing() -> f32 {
    0.2
}
fn default_true() -> bool {
    true
}
fn default_arc() -> f32 {
    120.0
}
fn default_mandala_radius() -> f32 {
    0.3
}
fn default_pair_spread() -> f32 {
    20.0
}
fn default_cluster_spread() -> f32 {
    15.0
}
fn default_groups() -> usize {
    3
}

/// Named arrangement applied across one batch. Angles are in degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FormationShape {
    #[serde(rename_all = "camelCase")]
    Stack {
        #[serde(default = "default_spacing")]
        spacing: f32,
        #[serde(default)]
        axis: Axis,
        #[serde(default = "default_true")]
        centered: bool,
        #[serde(default)]
        stagger: f32,
    },
    #[serde(rename_all = "camelCase")]
    Spiral {
        #[serde(default = "default_arc")]
        arc_offset: f32,
        #[serde(default)]
        spacing: f32,
        #[serde(default)]
        stagger: f32,
    },
    #[serde(rename_all = "camelCase")]
    Mandala {
        #[serde(default = "default_mandala_radius")]
        radius: f32,
        #[serde(default)]
        arc_offset: f32,
        #[serde(default)]
        stagger: f32,
    },
    #[serde(rename_all = "camelCase")]
    Pairs {
        #[serde(default = "default_pair_spread")]
        spread: f32,
        #[serde(default)]
        stagger: f32,
    },
    #[serde(rename_all = "camelCase")]
    Cluster {
        #[serde(default = "default_groups")]
        groups: usize,
        #[serde(default = "default_cluster_spread")]
        spread: f32,
        #[serde(default)]
        stagger: f32,
    },
}

impl FormationShape {
    fn stagger(&self) -> f32 {
        match self {
            FormationShape::Stack { stagger, .. }
            | FormationShape::Spiral { stagger, .. }
            | FormationShape::Mandala { stagger, .. }
            | FormationShape::Pairs { stagger, .. }
            | FormationShape::Cluster { stagger, .. } => *stagger,
        }
    }

    /// Whether the shape assigns angles (as opposed to leaving angle choice to the formation).
    pub fn assigns_rotation(&self) -> bool {
        !matches!(self, FormationShape::Stack { .. })
    }
}

const MAX_PROGRESS_OFFSET: f32 = 0.95;

/// Expand a shape into exactly `count` offsets. `travel` is the formation's
/// main axis; spiral spacing runs along it and mandala rings lie across it.
pub fn expand_shape(shape: Option<&FormationShape>, count: usize, travel: Axis) -> Vec<FormationOffset> {
    let mut out = vec![FormationOffset::default(); count];
    let Some(shape) = shape else {
        return out;
    };

    match *shape {
        FormationShape::Stack {
            spacing,
            axis,
            centered,
            ..
        } => {
            let shift = if centered {
                (count.saturating_sub(1)) as f32 * spacing / 2.0
            } else {
                0.0
            };
            for (i, o) in out.iter_mut().enumerate() {
                o.position = axis.unit() * (i as f32 * spacing - shift);
            }
        }
        FormationShape::Spiral {
            arc_offset,
            spacing,
            ..
        } => {
            let arc = arc_offset.to_radians();
            for (i, o) in out.iter_mut().enumerate() {
                o.rotation = (i as f32 * arc).rem_euclid(TAU);
                o.position = travel.unit() * (i as f32 * spacing);
            }
        }
        FormationShape::Mandala {
            radius, arc_offset, ..
        } => {
            let ring = count.saturating_sub(1).max(1) as f32;
            let start = arc_offset.to_radians();
            let (u, v) = travel.plane();
            for (i, o) in out.iter_mut().enumerate().skip(1) {
                let angle = (start + (i - 1) as f32 * TAU / ring).rem_euclid(TAU);
                o.position = (u * angle.cos() + v * angle.sin()) * radius;
                o.rotation = angle;
            }
        }
        FormationShape::Pairs { spread, .. } => {
            let pairs = count.div_ceil(2).max(1);
            let half = spread.to_radians() / 2.0;
            for (i, o) in out.iter_mut().enumerate() {
                let pair = i / 2;
                let unpaired = count % 2 == 1 && i + 1 == count;
                let side = if unpaired {
                    0.0
                } else if i % 2 == 0 {
                    -1.0
                } else {
                    1.0
                };
                o.rotation = (pair as f32 * TAU / pairs as f32 + side * half).rem_euclid(TAU);
            }
        }
        FormationShape::Cluster { groups, spread, .. } => {
            let g = groups.clamp(1, count.max(1));
            let spread = spread.to_radians();
            for (i, o) in out.iter_mut().enumerate() {
                let group = i % g;
                let member = i / g;
                let in_group = (count - group).div_ceil(g);
                let centered = member as f32 - (in_group as f32 - 1.0) / 2.0;
                o.rotation =
                    (group as f32 * TAU / g as f32 + centered * spread).rem_euclid(TAU);
            }
        }
    }

    let stagger = shape.stagger().max(0.0);
    if stagger > 0.0 {
        for (i, o) in out.iter_mut().enumerate() {
            o.progress_offset = (i as f32 * stagger).min(MAX_PROGRESS_OFFSET);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_shape_is_identity() {
        let offs = expand_shape(None, 3, Axis::Y);
        assert_eq!(offs.len(), 3);
        assert!(offs.iter().all(|o| *o == FormationOffset::default()));
    }

    #[test]
    fn zero_count_is_empty() {
        let shape = FormationShape::Mandala {
            radius: 0.3,
            arc_offset: 0.0,
            stagger: 0.0,
        };
        assert!(expand_shape(Some(&shape), 0, Axis::Y).is_empty());
    }

    #[test]
    fn mandala_center_plus_ring() {
        let shape = FormationShape::Mandala {
            radius: 0.5,
            arc_offset: 0.0,
            stagger: 0.0,
        };
        let offs = expand_shape(Some(&shape), 5, Axis::Y);
        assert_eq!(offs[0].position, Vec3::ZERO);
        for o in &offs[1..] {
            assert!((o.position.length() - 0.5).abs() < 1e-5);
            assert!(o.position.y.abs() < 1e-6);
        }
        assert!((offs[2].rotation - TAU / 4.0).abs() < 1e-5);
    }

    #[test]
    fn stagger_is_capped() {
        let shape = FormationShape::Stack {
            spacing: 0.1,
            axis: Axis::Y,
            centered: true,
            stagger: 0.5,
        };
        let offs = expand_shape(Some(&shape), 4, Axis::Y);
        assert_eq!(offs[1].progress_offset, 0.5);
        assert_eq!(offs[3].progress_offset, MAX_PROGRESS_OFFSET);
    }

    #[test]
    fn odd_pairs_leave_last_unsplit() {
        let shape = FormationShape::Pairs {
            spread: 20.0,
            stagger: 0.0,
        };
        let offs = expand_shape(Some(&shape), 3, Axis::Y);
        let half = 10f32.to_radians();
        assert!((offs[0].rotation - (TAU - half)).abs() < 1e-5);
        assert!((offs[1].rotation - half).abs() < 1e-5);
        assert!((offs[2].rotation - TAU / 2.0).abs() < 1e-5);
    }
}
