//! First-person observer.
//!
//! Input, pose, the Free/Arrived state machine and sliding collision
//! against the maze's wall faces.

pub mod input;
pub mod state;
pub mod collision;
pub mod controller;

pub use input::{ControlInput, InputDelta, InputRecording};
pub use state::{Observer, ObserverPhase, ObserverPose};
pub use controller::{ObserverController, StepOutcome};
