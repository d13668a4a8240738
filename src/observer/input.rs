//! Control Input
//!
//! One tick of observer input: held movement/rotation buttons, one-shot
//! toggles and pointer deltas. Recordings store only the ticks where input
//! changed, so a run can be replayed exactly.

use serde::{Serialize, Deserialize};

// =============================================================================
// INPUT TYPES
// =============================================================================

/// Input state for a single tick.
///
/// Toggle flags are one-shot: the caller sets them on the tick the key went
/// down and clears them afterwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlInput {
    /// Button flags (packed bits, see the `FORWARD`.. constants)
    pub buttons: u16,

    /// Horizontal pointer movement since the last tick
    pub pointer_dx: f32,

    /// Vertical pointer movement since the last tick
    pub pointer_dy: f32,
}

impl ControlInput {
    /// Move along the look direction
    pub const FORWARD: u16 = 1 << 0;
    /// Move against the look direction
    pub const BACK: u16 = 1 << 1;
    /// Strafe left
    pub const STRAFE_LEFT: u16 = 1 << 2;
    /// Strafe right
    pub const STRAFE_RIGHT: u16 = 1 << 3;
    /// Turn left (counter-clockwise about up)
    pub const ROTATE_LEFT: u16 = 1 << 4;
    /// Turn right
    pub const ROTATE_RIGHT: u16 = 1 << 5;
    /// Flip collision on/off (one-shot)
    pub const TOGGLE_COLLISION: u16 = 1 << 6;
    /// Show/hide the minimap (one-shot)
    pub const TOGGLE_MINIMAP: u16 = 1 << 7;
    /// Show/hide the solution overlay (one-shot)
    pub const TOGGLE_PATH: u16 = 1 << 8;

    /// Create an idle input.
    pub const fn new() -> Self {
        Self {
            buttons: 0,
            pointer_dx: 0.0,
            pointer_dy: 0.0,
        }
    }

    /// Create input with the given buttons held.
    pub const fn with_buttons(buttons: u16) -> Self {
        Self {
            buttons,
            pointer_dx: 0.0,
            pointer_dy: 0.0,
        }
    }

    /// Create input with only pointer movement.
    pub const fn with_pointer(dx: f32, dy: f32) -> Self {
        Self {
            buttons: 0,
            pointer_dx: dx,
            pointer_dy: dy,
        }
    }

    /// Check a button flag.
    #[inline]
    pub fn pressed(&self, button: u16) -> bool {
        self.buttons & button != 0
    }

    /// Set or clear a button flag.
    #[inline]
    pub fn set(&mut self, button: u16, pressed: bool) {
        if pressed {
            self.buttons |= button;
        } else {
            self.buttons &= !button;
        }
    }

    /// Builder form of [`ControlInput::set`].
    #[inline]
    pub fn with(mut self, button: u16) -> Self {
        self.set(button, true);
        self
    }
}

/// Input change entry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputDelta {
    /// Tick when this input state began
    pub tick: u32,
    /// The new input state
    pub input: ControlInput,
}

// =============================================================================
// RECORDING
// =============================================================================

/// Delta-compressed input recording for one run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InputRecording {
    /// Seed of the maze the recording was made against
    pub seed: u64,

    /// Last tick covered by the recording
    pub end_tick: u32,

    deltas: Vec<InputDelta>,
}

impl InputRecording {
    /// Create an empty recording.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            end_tick: 0,
            deltas: Vec::with_capacity(256),
        }
    }

    /// Record input for a tick. Only stored if it changed.
    ///
    /// Ticks must be recorded in increasing order. The comparison is against
    /// the last stored change, so recording can resume on a deserialized copy.
    pub fn record(&mut self, tick: u32, input: ControlInput) {
        self.end_tick = tick;
        let last = self.deltas.last().map_or(ControlInput::new(), |d| d.input);
        if input != last {
            self.deltas.push(InputDelta { tick, input });
        }
    }

    /// Input in effect at a tick (idle before the first change).
    pub fn get_input_at(&self, tick: u32) -> ControlInput {
        let idx = self.deltas.partition_point(|d| d.tick <= tick);
        if idx == 0 {
            ControlInput::new()
        } else {
            self.deltas[idx - 1].input
        }
    }

    /// Stored changes.
    pub fn deltas(&self) -> &[InputDelta] {
        &self.deltas
    }

    /// Number of stored changes.
    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_flags() {
        let mut input = ControlInput::new();
        assert_eq!(input, ControlInput::default());
        assert!(!input.pressed(ControlInput::FORWARD));

        input.set(ControlInput::FORWARD, true);
        input.set(ControlInput::TOGGLE_PATH, true);
        assert!(input.pressed(ControlInput::FORWARD));
        assert!(input.pressed(ControlInput::TOGGLE_PATH));

        input.set(ControlInput::FORWARD, false);
        assert!(!input.pressed(ControlInput::FORWARD));
        assert_eq!(input.buttons, ControlInput::TOGGLE_PATH);

        let rotate = ControlInput::new().with(ControlInput::ROTATE_LEFT);
        assert_eq!(rotate, ControlInput::with_buttons(ControlInput::ROTATE_LEFT));
        assert_ne!(ControlInput::with_pointer(1.0, 0.0), ControlInput::new());
    }

    #[test]
    fn test_delta_compression() {
        let mut recording = InputRecording::new(7);
        let forward = ControlInput::with_buttons(ControlInput::FORWARD);
        for tick in 0..4 {
            recording.record(tick, forward);
        }
        assert_eq!(recording.delta_count(), 1);

        recording.record(4, ControlInput::with_buttons(ControlInput::BACK));
        assert_eq!(recording.delta_count(), 2);
        assert_eq!(recording.end_tick, 4);

        // Idle first tick never produces a delta
        let mut idle = InputRecording::new(7);
        idle.record(0, ControlInput::new());
        assert_eq!(idle.delta_count(), 0);
    }

    #[test]
    fn test_get_input_at() {
        let mut recording = InputRecording::new(1);
        let a = ControlInput::with_buttons(ControlInput::FORWARD);
        let b = ControlInput::with_pointer(3.0, -1.0);
        recording.record(10, a);
        recording.record(20, b);

        assert_eq!(recording.get_input_at(5), ControlInput::new());
        assert_eq!(recording.get_input_at(10), a);
        assert_eq!(recording.get_input_at(19), a);
        assert_eq!(recording.get_input_at(20), b);
        assert_eq!(recording.get_input_at(500), b);
    }

    #[test]
    fn test_recording_serde() {
        let mut recording = InputRecording::new(42);
        recording.record(0, ControlInput::with_pointer(0.5, 0.25));
        recording.record(9, ControlInput::with_buttons(ControlInput::TOGGLE_COLLISION));

        let json = serde_json::to_string(&recording).unwrap();
        let restored: InputRecording = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.seed, 42);
        assert_eq!(restored.end_tick, 9);
        assert_eq!(restored.deltas(), recording.deltas());
    }

    #[test]
    fn test_recording_resumes_after_serde() {
        let mut recording = InputRecording::new(3);
        recording.record(0, ControlInput::with_buttons(ControlInput::FORWARD));

        let json = serde_json::to_string(&recording).unwrap();
        let mut resumed: InputRecording = serde_json::from_str(&json).unwrap();

        // Releasing the key right after loading must still be stored
        resumed.record(1, ControlInput::new());
        resumed.record(2, ControlInput::new());
        assert_eq!(resumed.delta_count(), 2);
        assert_eq!(resumed.get_input_at(1), ControlInput::new());
        assert!(resumed.get_input_at(0).pressed(ControlInput::FORWARD));

        // Holding the same input after loading is still compressed
        let mut held: InputRecording = serde_json::from_str(&json).unwrap();
        held.record(1, ControlInput::with_buttons(ControlInput::FORWARD));
        assert_eq!(held.delta_count(), 1);
    }
}
