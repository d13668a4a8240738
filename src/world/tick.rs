//! World Tick
//!
//! One simulation step of the whole world. Order within a tick:
//!
//! 1. Minimap and path overlay toggles
//! 2. Observer controller (rotation, movement, collision, exit check)
//! 3. Minimap visited marks
//! 4. Exit fade; a finished fade-out resets the maze when `auto_reset` is on
//!
//! Replaying a recording against the same config reproduces the world
//! exactly, which is checked by comparing [`World::compute_hash`].

use tracing::{debug, warn};

use crate::config::WorldConfig;
use crate::error::ConfigError;
use crate::observer::{ControlInput, InputRecording};
use crate::world::events::{WorldEvent, WorldEventData};
use crate::world::fade::FadeStep;
use crate::world::state::World;

/// Result of a tick.
#[derive(Clone, Debug, Default)]
pub struct TickResult {
    /// Events generated this tick
    pub events: Vec<WorldEvent>,
    /// Whether the maze was regenerated this tick
    pub maze_reset: bool,
}

impl TickResult {
    /// True if an event matching the predicate was produced.
    pub fn has(&self, predicate: impl Fn(&WorldEventData) -> bool) -> bool {
        self.events.iter().any(|e| predicate(&e.data))
    }
}

/// Run one simulation tick.
pub fn tick(world: &mut World, input: &ControlInput) -> TickResult {
    let mut result = TickResult::default();
    world.tick = world.tick.wrapping_add(1);
    let now = world.tick;

    // 1. Display toggles
    if input.pressed(ControlInput::TOGGLE_MINIMAP) {
        let visible = world.minimap.toggle_visibility();
        result.events.push(WorldEvent::new(now, WorldEventData::MinimapToggled { visible }));
    }
    if input.pressed(ControlInput::TOGGLE_PATH) {
        let shown = world.minimap.toggle_path_overlay();
        result.events.push(WorldEvent::new(now, WorldEventData::PathOverlayToggled { shown }));
    }

    // 2. Observer
    let outcome = world.controller.advance(input, &world.maze);
    if let Some(enabled) = outcome.collision_toggled {
        result.events.push(WorldEvent::new(now, WorldEventData::CollisionToggled { enabled }));
    }
    if outcome.reached_exit {
        world.fade.start();
        let position = world.controller.position_2d();
        result.events.push(WorldEvent::new(now, WorldEventData::ExitReached { position }));
    }
    if outcome.arrival_complete {
        result.events.push(WorldEvent::new(now, WorldEventData::ArrivalComplete));
    }

    // 3. Minimap marks
    world.minimap.mark_visited(world.controller.position_2d());

    // 4. Exit fade
    match world.fade.advance() {
        FadeStep::OutComplete if world.config.auto_reset => match world.reset() {
            Ok(()) => {
                let (width, height) = world.maze.dimensions();
                result.maze_reset = true;
                result.events.push(WorldEvent::new(
                    now,
                    WorldEventData::MazeReset {
                        generation: world.generation,
                        width,
                        height,
                    },
                ));
            }
            Err(err) => warn!(%err, "maze reset failed"),
        },
        FadeStep::OutComplete => debug!(tick = now, "fade-out complete, waiting for reset"),
        FadeStep::InComplete => debug!(tick = now, "fade-in complete"),
        FadeStep::Running => {}
    }

    result
}

/// Rebuild a world from a recording.
///
/// The recording's seed overrides the config's. Ticks `0..ticks` are
/// simulated with the input in effect at each tick.
pub fn replay(
    config: &WorldConfig,
    recording: &InputRecording,
    ticks: u32,
) -> Result<World, ConfigError> {
    let config = WorldConfig {
        seed: Some(recording.seed),
        ..config.clone()
    };
    let mut world = World::new(config)?;
    for t in 0..ticks {
        let input = recording.get_input_at(t);
        tick(&mut world, &input);
    }
    Ok(world)
}

// =============================================================================
// TESTS
// =============================================================================
