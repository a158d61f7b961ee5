//! Rotation for each orientation mode, in container-local space.

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};

use crate::formation::Placement;
use crate::sizing::OrientationMode;

/// Per-frame inputs shared by every element of a frame.
#[derive(Copy, Clone, Debug)]
pub struct OrientationContext {
    /// Camera rotation expressed in container space.
    pub camera_rotation: Quat,
    /// Camera position in container space.
    pub camera_position: Vec3,
    /// Push toward the camera for billboards, already scaled to world units.
    pub camera_push: f32,
}

/// Rotation for `mode`. `heading` keeps the last travel direction so
/// velocity-aligned elements do not snap when they stop.
pub fn resolve_rotation(
    mode: OrientationMode,
    placement: &Placement,
    velocity: Vec3,
    ctx: &OrientationContext,
    heading: &mut Vec3,
) -> Quat {
    let arc = placement.arc_rotation;
    match mode {
        OrientationMode::Camera => ctx.camera_rotation * Quat::from_rotation_z(arc),
        OrientationMode::Flat => Quat::from_rotation_y(arc) * Quat::from_rotation_x(-FRAC_PI_2),
        OrientationMode::Radial => {
            let dir = placement
                .facing
                .and_then(Vec3::try_normalize)
                .or_else(|| Vec3::new(placement.position.x, 0.0, placement.position.z).try_normalize())
                .unwrap_or(Vec3::Y);
            Quat::from_rotation_arc(Vec3::Y, dir) * Quat::from_rotation_y(arc)
        }
        OrientationMode::Velocity => {
            if let Some(dir) = velocity.try_normalize() {
                *heading = dir;
            }
            Quat::from_rotation_arc(Vec3::Y, *heading)
        }
        OrientationMode::Upright => Quat::from_rotation_y(arc),
    }
}

/// Billboards sit slightly in front of the mascot from the camera's view.
pub fn push_toward_camera(mode: OrientationMode, position: Vec3, ctx: &OrientationContext) -> Vec3 {
    if mode != OrientationMode::Camera || ctx.camera_push == 0.0 {
        return position;
    }
    match (ctx.camera_position - position).try_normalize() {
        Some(dir) => position + dir * ctx.camera_push,
        None => position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> OrientationContext {
        OrientationContext {
            camera_rotation: Quat::IDENTITY,
            camera_position: Vec3::new(0.0, 0.0, 5.0),
            camera_push: 0.1,
        }
    }

    fn placed(position: Vec3) -> Placement {
        Placement {
            position,
            scale: 1.0,
            facing: None,
            arc_rotation: 0.0,
        }
    }

    #[test]
    fn flat_faces_up() {
        let mut heading = Vec3::Y;
        let q = resolve_rotation(OrientationMode::Flat, &placed(Vec3::X), Vec3::ZERO, &ctx(), &mut heading);
        assert!((q * Vec3::Z - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn velocity_keeps_heading_when_stopped() {
        let mut heading = Vec3::Y;
        let p = placed(Vec3::ZERO);
        resolve_rotation(OrientationMode::Velocity, &p, Vec3::X * 2.0, &ctx(), &mut heading);
        assert!((heading - Vec3::X).length() < 1e-6);
        let q = resolve_rotation(OrientationMode::Velocity, &p, Vec3::ZERO, &ctx(), &mut heading);
        assert!((q * Vec3::Y - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn push_only_moves_billboards() {
        let c = ctx();
        assert_eq!(push_toward_camera(OrientationMode::Flat, Vec3::ZERO, &c), Vec3::ZERO);
        let pushed = push_toward_camera(OrientationMode::Camera, Vec3::ZERO, &c);
        assert!((pushed.z - 0.1).abs() < 1e-6);
    }
}
