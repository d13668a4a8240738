//! Exit Fade
//!
//! Screen fade played when the observer reaches the exit:
//!
//! ```text
//!   level
//!     1 |        ________
//!       |      /          \
//!       |    /              \
//!     0 |__/                  \_____
//!          ^ exit   ^ out done  ^ in done
//!          |  300   |   (reset) |  150 ticks
//! ```
//!
//! The sequencer only tracks time. The world decides what happens when the
//! fade-out completes.

use serde::{Serialize, Deserialize};

use crate::config::FadeConfig;

/// Current fade phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum FadeMode {
    /// No fade in progress
    #[default]
    Idle = 0,
    /// Going dark
    FadingOut = 1,
    /// Fully dark, waiting for the maze to be reset
    Black = 2,
    /// Coming back
    FadingIn = 3,
}

/// What a call to [`ExitFade::advance`] finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadeStep {
    /// Nothing finished
    Running,
    /// The screen just went fully dark
    OutComplete,
    /// The screen is fully visible again
    InComplete,
}

/// Fade sequencer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitFade {
    out_ticks: u32,
    in_ticks: u32,
    mode: FadeMode,
    elapsed: u32,
}

impl ExitFade {
    /// Idle sequencer with the configured durations.
    pub fn new(config: &FadeConfig) -> Self {
        Self {
            out_ticks: config.out_ticks.max(1),
            in_ticks: config.in_ticks.max(1),
            mode: FadeMode::Idle,
            elapsed: 0,
        }
    }

    /// Begin fading out. Ignored unless idle.
    pub fn start(&mut self) {
        if self.mode == FadeMode::Idle {
            self.mode = FadeMode::FadingOut;
            self.elapsed = 0;
        }
    }

    /// Begin fading back in from wherever the fade-out got to.
    pub fn fade_in(&mut self) {
        if matches!(self.mode, FadeMode::FadingOut | FadeMode::Black) {
            self.mode = FadeMode::FadingIn;
            self.elapsed = 0;
        }
    }

    /// Advance one tick.
    pub fn advance(&mut self) -> FadeStep {
        match self.mode {
            FadeMode::FadingOut => {
                self.elapsed += 1;
                if self.elapsed >= self.out_ticks {
                    self.mode = FadeMode::Black;
                    self.elapsed = 0;
                    return FadeStep::OutComplete;
                }
            }
            FadeMode::FadingIn => {
                self.elapsed += 1;
                if self.elapsed >= self.in_ticks {
                    self.mode = FadeMode::Idle;
                    self.elapsed = 0;
                    return FadeStep::InComplete;
                }
            }
            FadeMode::Idle | FadeMode::Black => {}
        }
        FadeStep::Running
    }

    /// Darkness in `0.0..=1.0` (0 = clear, 1 = black).
    pub fn fade_level(&self) -> f32 {
        match self.mode {
            FadeMode::Idle => 0.0,
            FadeMode::FadingOut => self.elapsed as f32 / self.out_ticks as f32,
            FadeMode::Black => 1.0,
            FadeMode::FadingIn => 1.0 - self.elapsed as f32 / self.in_ticks as f32,
        }
    }

    /// Current phase.
    #[inline]
    pub fn mode(&self) -> FadeMode {
        self.mode
    }

    /// Ticks spent in the current phase.
    #[inline]
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    /// True while any fade is playing or holding black.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.mode != FadeMode::Idle
    }
}

// =============================================================================
// TESTS
// =============================================================================
