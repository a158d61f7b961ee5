//! Surface: elements cling to points sampled from the mascot's own geometry.
//!
//! Sampling is weighted (pattern bias × camera visibility) and enforces a
//! minimum pairwise separation by rejection. After `max_attempts`
//! consecutive rejections the threshold halves for the rest of the batch,
//! so dense requests always terminate.

use glam::Vec3;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::progress::{stagger, ProgressWindow};
use super::shape::FormationOffset;
use super::{ExpandContext, Placement};
use crate::easing::{lerp, Easing};
use crate::error::{ElementalError, Result};
use crate::sizing::OrientationMode;

/// Thresholds below this are treated as zero.
const MIN_SEPARATION_FLOOR: f32 = 1e-4;
const PATTERN_FLOOR: f32 = 0.05;

/// A point on the mascot surface, mascot-local and radius-normalized.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfacePoint {
    pub position: Vec3,
    pub normal: Vec3,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfacePattern {
    #[default]
    Uniform,
    /// Favor points high on the body.
    Top,
    Bottom,
    /// Favor normals pointing away from the mascot center.
    Outward,
    /// Favor normals facing +Z (the mascot's front).
    Front,
}

impl SurfacePattern {
    fn weight(self, p: &SurfacePoint) -> f32 {
        let bias = match self {
            SurfacePattern::Uniform => return 1.0,
            SurfacePattern::Top => (0.5 + 0.5 * p.position.y).max(0.0).powi(2),
            SurfacePattern::Bottom => (0.5 - 0.5 * p.position.y).max(0.0).powi(2),
            SurfacePattern::Outward => p.normal.dot(p.position.normalize_or_zero()).max(0.0),
            SurfacePattern::Front => p.normal.z.max(0.0),
        };
        bias + PATTERN_FLOOR
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurfaceSpec {
    pub pattern: SurfacePattern,
    /// Extra weight for points whose normal faces the camera.
    pub camera_bias: f32,
    /// Minimum separation in mascot radii.
    pub min_distance: f32,
    pub max_attempts: u32,
    /// Lift off the surface along the normal, mascot radii.
    pub normal_offset: f32,
    pub start_scale: f32,
    pub end_scale: f32,
    pub easing: Easing,
    /// Progress delay per element.
    pub stagger: f32,
    pub orientation: Option<OrientationMode>,
    pub reverse_at: Option<f32>,
    pub hold_at: Option<f32>,
}

impl Default for SurfaceSpec {
    fn default() -> Self {
        Self {
            pattern: SurfacePattern::Uniform,
            camera_bias: 0.5,
            min_distance: 0.15,
            max_attempts: 30,
            normal_offset: 0.02,
            start_scale: 0.0,
            end_scale: 1.0,
            easing: Easing::EaseOutCubic,
            stagger: 0.0,
            orientation: None,
            reverse_at: None,
            hold_at: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceConfig {
    pub pattern: SurfacePattern,
    pub camera_bias: f32,
    pub min_distance: f32,
    pub max_attempts: u32,
    pub normal_offset: f32,
    pub start_scale: f32,
    pub end_scale: f32,
    pub easing: Easing,
    pub stagger: f32,
    pub orientation: Option<OrientationMode>,
    pub window: ProgressWindow,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceSlot {
    pub offset: FormationOffset,
    pub point: SurfacePoint,
}

/// Chosen points plus the separation threshold in force when sampling ended.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceSampling {
    pub points: Vec<SurfacePoint>,
    pub min_distance: f32,
}

pub fn parse(spec: &SurfaceSpec) -> Result<SurfaceConfig> {
    if spec.min_distance < 0.0 {
        return Err(ElementalError::InvalidConfig {
            field: "surface.minDistance",
            reason: format!("negative distance {}", spec.min_distance),
        });
    }
    Ok(SurfaceConfig {
        pattern: spec.pattern,
        camera_bias: spec.camera_bias.max(0.0),
        min_distance: spec.min_distance,
        max_attempts: spec.max_attempts.max(1),
        normal_offset: spec.normal_offset,
        start_scale: spec.start_scale,
        end_scale: spec.end_scale,
        easing: spec.easing,
        stagger: spec.stagger.max(0.0),
        orientation: spec.orientation,
        window: ProgressWindow::new(spec.reverse_at, spec.hold_at),
    })
}

/// Weighted sampling without replacement with a relaxing separation threshold.
pub fn sample_surface_points(
    candidates: &[SurfacePoint],
    count: usize,
    cfg: &SurfaceConfig,
    view_dir: Vec3,
    rng: &mut StdRng,
) -> SurfaceSampling {
    let mut remaining: Vec<usize> = (0..candidates.len()).collect();
    let weights: Vec<f32> = candidates
        .iter()
        .map(|p| {
            let facing = p.normal.dot(view_dir).max(0.0);
            cfg.pattern.weight(p) * (1.0 + cfg.camera_bias * facing)
        })
        .collect();

    let mut chosen: Vec<SurfacePoint> = Vec::with_capacity(count.min(candidates.len()));
    let mut min_distance = cfg.min_distance;
    let mut attempts = 0u32;

    while chosen.len() < count && !remaining.is_empty() {
        let k = match WeightedIndex::new(remaining.iter().map(|&i| weights[i])) {
            Ok(dist) => dist.sample(rng),
            Err(_) => rng.gen_range(0..remaining.len()),
        };
        let candidate = candidates[remaining[k]];
        let separated = chosen
            .iter()
            .all(|c| c.position.distance(candidate.position) >= min_distance);
        if separated {
            chosen.push(candidate);
            remaining.swap_remove(k);
            attempts = 0;
            continue;
        }
        attempts += 1;
        if attempts >= cfg.max_attempts {
            min_distance *= 0.5;
            if min_distance < MIN_SEPARATION_FLOOR {
                min_distance = 0.0;
            }
            attempts = 0;
            log::debug!("surface sampling relaxed min distance to {min_distance}");
        }
    }

    SurfaceSampling {
        points: chosen,
        min_distance,
    }
}

pub fn expand(cfg: &SurfaceConfig, count: usize, ctx: &mut ExpandContext<'_>) -> Vec<SurfaceSlot> {
    if count > 0 && ctx.surface.is_empty() {
        log::warn!("surface formation requested but no mascot surface points are set");
        return Vec::new();
    }
    let sampling = sample_surface_points(ctx.surface, count, cfg, ctx.view_dir, ctx.rng);
    sampling
        .points
        .into_iter()
        .enumerate()
        .map(|(i, point)| SurfaceSlot {
            offset: FormationOffset {
                progress_offset: (i as f32 * cfg.stagger).min(0.95),
                ..FormationOffset::default()
            },
            point,
        })
        .collect()
}

pub fn calculate_surface_position(
    cfg: &SurfaceConfig,
    slot: &SurfaceSlot,
    progress: f32,
    mascot_radius: f32,
) -> Placement {
    let p = cfg.window.apply(stagger(progress, slot.offset.progress_offset));
    let e = cfg.easing.apply(p);
    let local = slot.point.position + slot.point.normal * cfg.normal_offset;
    Placement {
        position: local * mascot_radius,
        scale: lerp(cfg.start_scale, cfg.end_scale, e) * slot.offset.scale,
        facing: slot.point.normal.try_normalize(),
        arc_rotation: slot.offset.rotation,
    }
}
