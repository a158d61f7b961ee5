//! Active element records and the per-type gesture clock.

use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::animation::AnimationState;
use crate::formation::{Formation, FormationSlot};
use crate::ids::ElementId;
use crate::sizing::OrientationMode;

/// One spawned element, mutated every frame by the spawner.
#[derive(Clone, Debug)]
pub struct ActiveElement {
    pub id: ElementId,
    pub element_type: String,
    pub model: String,
    pub model_index: usize,
    /// Layer within the spawn call that created it.
    pub layer: usize,
    /// Spawner time at spawn, seconds.
    pub spawn_time: f32,
    pub formation: Arc<Formation>,
    pub slot: FormationSlot,
    pub orientation: OrientationMode,
    /// Scale-class multiplier of the model.
    pub scale_class: f32,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
    pub opacity: f32,
    pub heading: Vec3,
    pub animation: Option<AnimationState>,
    /// Opacity when a pool fade started; the fade scales it down to 0.
    pub fade_from: Option<f32>,
}

impl ActiveElement {
    pub fn age(&self, now: f32) -> f32 {
        (now - self.spawn_time).max(0.0)
    }

    /// Progress handed to the formation: local to the element's window when it has one.
    pub fn formation_progress(&self, gesture_progress: f32) -> f32 {
        match &self.animation {
            Some(anim) if anim.has_window() => anim.local_progress(gesture_progress),
            _ => gesture_progress,
        }
    }
}

/// Progress source for one type's current batch.
///
/// Host-supplied progress wins. A batch the host drove and then stopped
/// driving is frozen at 1.0; a batch never driven runs on its own duration.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureClock {
    elapsed: f32,
    duration: f32,
    driven: bool,
}

impl GestureClock {
    pub fn new(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration,
            driven: false,
        }
    }

    pub fn advance(&mut self, dt: f32, external: Option<f32>) -> f32 {
        self.elapsed += dt.max(0.0);
        match external {
            Some(p) => {
                self.driven = true;
                p.clamp(0.0, 1.0)
            }
            None if self.driven => 1.0,
            None if self.duration <= 0.0 => 1.0,
            None => (self.elapsed / self.duration).min(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_freezes_after_host_stops_driving() {
        let mut c = GestureClock::new(2.0);
        assert_eq!(c.advance(0.1, Some(0.3)), 0.3);
        assert_eq!(c.advance(0.1, None), 1.0);
    }

    #[test]
    fn undriven_clock_runs_on_duration() {
        let mut c = GestureClock::new(2.0);
        assert_eq!(c.advance(0.5, None), 0.25);
        assert_eq!(c.advance(5.0, None), 1.0);
    }
}
