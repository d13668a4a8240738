//! World simulation.
//!
//! The application object tying maze, observer, minimap and exit fade
//! together, plus the per-tick driver and replay.

pub mod state;
pub mod events;
pub mod fade;
pub mod tick;

pub use state::World;
pub use events::{WorldEvent, WorldEventData};
pub use fade::{ExitFade, FadeMode, FadeStep};
pub use tick::{tick, replay, TickResult};
