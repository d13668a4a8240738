//! Observer state.

use glam::{Mat4, Vec2, Vec3};
use serde::{Serialize, Deserialize};

use crate::config::ObserverConfig;

/// First-person viewpoint.
///
/// Only the controller mutates an observer; consumers read it through
/// [`ObserverPose`] or the accessors.
#[derive(Clone, Debug, PartialEq)]
pub struct Observer {
    pub(crate) position: Vec3,
    pub(crate) look: Vec3,
    pub(crate) up: Vec3,
    pub(crate) view: Mat4,
}

impl Observer {
    /// Observer at the configured spawn point.
    pub(crate) fn spawn(config: &ObserverConfig) -> Self {
        let mut observer = Self {
            position: config.spawn.extend(config.eye_height),
            look: config.spawn_look.normalize_or_zero(),
            up: Vec3::Z,
            view: Mat4::IDENTITY,
        };
        observer.refresh_view();
        observer
    }

    /// Recompute the view transform from position, look and up.
    #[inline]
    pub(crate) fn refresh_view(&mut self) {
        self.view = Mat4::look_at_rh(self.position, self.position + self.look, self.up);
    }

    /// Eye position (z is height).
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit look direction.
    #[inline]
    pub fn look(&self) -> Vec3 {
        self.look
    }

    /// Up axis (always +Z).
    #[inline]
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// World-to-view transform.
    #[inline]
    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// Position on the ground plane.
    #[inline]
    pub fn position_2d(&self) -> Vec2 {
        self.position.truncate()
    }

    /// Snapshot for renderers.
    pub fn pose(&self) -> ObserverPose {
        ObserverPose {
            position: self.position,
            view: self.view,
        }
    }
}

/// Read-only pose handed to the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObserverPose {
    /// Eye position
    pub position: Vec3,
    /// World-to-view transform
    pub view: Mat4,
}

/// Controller state machine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ObserverPhase {
    /// Normal movement
    Free,
    /// Exit reached; gliding to the exit centre, translation input ignored
    Arrived {
        /// Ticks spent in this phase
        ticks: u32,
        /// Ground position when the exit tile was entered
        start: Vec2,
        /// Centre of the exit tile
        target: Vec2,
    },
}

impl ObserverPhase {
    /// True once the exit has been reached.
    #[inline]
    pub fn is_arrived(&self) -> bool {
        matches!(self, ObserverPhase::Arrived { .. })
    }
}
