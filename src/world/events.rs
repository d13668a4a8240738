//! World Events
//!
//! Events produced by [`tick`](crate::world::tick) for the presentation layer
//! and for replay verification.

use glam::Vec2;
use serde::{Serialize, Deserialize};

/// Event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum WorldEventData {
    /// Collision was switched on or off
    CollisionToggled {
        /// New state
        enabled: bool,
    },

    /// The observer stepped onto the exit tile
    ExitReached {
        /// Ground position at the moment of arrival
        position: Vec2,
    },

    /// The arrival glide finished
    ArrivalComplete,

    /// A fresh maze replaced the old one
    MazeReset {
        /// Maze generation counter after the reset
        generation: u32,
        /// Grid width in tiles
        width: usize,
        /// Grid height in tiles
        height: usize,
    },

    /// Minimap shown or hidden
    MinimapToggled {
        /// New visibility
        visible: bool,
    },

    /// Solution overlay shown or hidden
    PathOverlayToggled {
        /// New state
        shown: bool,
    },
}

/// An event with the tick it happened on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldEvent {
    /// Tick when the event occurred
    pub tick: u32,

    /// Event data
    pub data: WorldEventData,
}

impl WorldEvent {
    /// Create a new event.
    pub fn new(tick: u32, data: WorldEventData) -> Self {
        Self { tick, data }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self.data {
            WorldEventData::CollisionToggled { .. } => "collision_toggled",
            WorldEventData::ExitReached { .. } => "exit_reached",
            WorldEventData::ArrivalComplete => "arrival_complete",
            WorldEventData::MazeReset { .. } => "maze_reset",
            WorldEventData::MinimapToggled { .. } => "minimap_toggled",
            WorldEventData::PathOverlayToggled { .. } => "path_overlay_toggled",
        }
    }
}
