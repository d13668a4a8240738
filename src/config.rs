//! World Configuration
//!
//! Tuning for maze size, observer movement and the exit fade. Every field
//! has a default, so a JSON config only needs the values it changes:
//!
//! ```json
//! { "width": 20, "height": 12, "seed": 42, "observer": { "move_speed": 0.05 } }
//! ```

use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Serialize, Deserialize};

use crate::error::ConfigError;
use crate::maze::generator::validate_dimensions;
use crate::TICK_RATE;

/// Top-level configuration of a [`World`](crate::world::World).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Rooms along X
    pub width: u32,
    /// Rooms along Y
    pub height: u32,
    /// Maze seed; `None` seeds from the clock
    pub seed: Option<u64>,
    /// Observer tuning
    pub observer: ObserverConfig,
    /// Exit fade durations
    pub fade: FadeConfig,
    /// Regenerate the maze automatically once the fade-out finishes
    pub auto_reset: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            seed: None,
            observer: ObserverConfig::default(),
            fade: FadeConfig::default(),
            auto_reset: true,
        }
    }
}

impl WorldConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Check maze dimensions and every tuning value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_dimensions(self.width, self.height)?;
        self.observer.validate()?;
        self.fade.validate()
    }
}

/// Observer movement, collision and arrival tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// Tiles moved per tick
    pub move_speed: f32,
    /// Radians of yaw/pitch per pointer unit
    pub pointer_rotation: f32,
    /// Radians of yaw per tick while a rotate key is held
    pub key_rotation: f32,
    /// Minimum distance kept from wall lines
    pub clearance: f32,
    /// Walls nearer than this to the current position are not corrected
    pub flush_epsilon: f32,
    /// Maximum |look . up|
    pub pitch_limit: f32,
    /// Tiles around the current tile searched for faces
    pub query_radius: u32,
    /// Ticks taken to glide to the exit centre
    pub arrival_ticks: u32,
    /// Upward drift factor during arrival (per tick, growing)
    pub arrival_rise: f32,
    /// Look roll factor during arrival (radians per tick, growing)
    pub arrival_roll: f32,
    /// Eye height above the floor
    pub eye_height: f32,
    /// Spawn point on the ground plane
    pub spawn: Vec2,
    /// Initial look direction
    pub spawn_look: Vec3,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            move_speed: 1.5 / TICK_RATE as f32, // 1.5 tiles per second
            pointer_rotation: 0.001,
            key_rotation: 0.03,
            clearance: 0.05,
            flush_epsilon: 0.045,
            pitch_limit: 0.9,
            query_radius: 2,
            arrival_ticks: 60,
            arrival_rise: 0.0001,
            arrival_roll: 0.0003,
            eye_height: 1.7,
            spawn: Vec2::new(1.5, 1.5),
            spawn_look: Vec3::Y,
        }
    }
}

impl ObserverConfig {
    /// Reject values the controller cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("observer.move_speed", self.move_speed),
            ("observer.clearance", self.clearance),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Validation {
                    field,
                    reason: "must be a positive number",
                });
            }
        }

        let non_negative = [
            ("observer.pointer_rotation", self.pointer_rotation),
            ("observer.key_rotation", self.key_rotation),
            ("observer.flush_epsilon", self.flush_epsilon),
            ("observer.arrival_rise", self.arrival_rise),
            ("observer.arrival_roll", self.arrival_roll),
            ("observer.eye_height", self.eye_height),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Validation {
                    field,
                    reason: "must be zero or a positive number",
                });
            }
        }

        if self.flush_epsilon >= self.clearance {
            return Err(ConfigError::Validation {
                field: "observer.flush_epsilon",
                reason: "must be smaller than the clearance",
            });
        }
        if !(self.pitch_limit > 0.0 && self.pitch_limit < 1.0) {
            return Err(ConfigError::Validation {
                field: "observer.pitch_limit",
                reason: "must be between 0 and 1 (exclusive)",
            });
        }
        if self.arrival_ticks == 0 {
            return Err(ConfigError::Validation {
                field: "observer.arrival_ticks",
                reason: "must be at least 1",
            });
        }
        if !self.spawn.is_finite() {
            return Err(ConfigError::Validation {
                field: "observer.spawn",
                reason: "must be finite",
            });
        }
        if !self.spawn_look.is_finite() || self.spawn_look.truncate().length_squared() == 0.0 {
            return Err(ConfigError::Validation {
                field: "observer.spawn_look",
                reason: "must have a horizontal component",
            });
        }
        Ok(())
    }
}

/// Durations of the fade played when the exit is reached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FadeConfig {
    /// Ticks from full view to black
    pub out_ticks: u32,
    /// Ticks from black back to full view
    pub in_ticks: u32,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            out_ticks: 300, // 5 seconds
            in_ticks: 150,
        }
    }
}

impl FadeConfig {
    /// Both phases must last at least one tick.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.out_ticks == 0 {
            return Err(ConfigError::Validation {
                field: "fade.out_ticks",
                reason: "must be at least 1",
            });
        }
        if self.in_ticks == 0 {
            return Err(ConfigError::Validation {
                field: "fade.in_ticks",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MazeError;

    #[test]
    fn test_defaults_are_valid() {
        let config = WorldConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.observer.move_speed - 0.025).abs() < 1e-7);
        assert_eq!(config.fade.out_ticks, 300);
        assert_eq!(config.fade.in_ticks, 150);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = WorldConfig::from_json_str(
            r#"{ "width": 20, "seed": 42, "observer": { "move_speed": 0.05 } }"#,
        )
        .unwrap();
        assert_eq!(config.width, 20);
        assert_eq!(config.height, 10);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.observer.move_speed, 0.05);
        assert_eq!(config.observer.clearance, 0.05);
        assert_eq!(config.observer.spawn, Vec2::new(1.5, 1.5));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = WorldConfig {
            seed: Some(7),
            auto_reset: false,
            ..WorldConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(WorldConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        let err = WorldConfig::from_json_str(r#"{ "width": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Maze(MazeError::InvalidDimensions { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_rejects_bad_tuning() {
        let mut config = WorldConfig::default();
        config.observer.clearance = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { field: "observer.clearance", .. })
        ));

        let mut config = WorldConfig::default();
        config.observer.flush_epsilon = 0.06;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { field: "observer.flush_epsilon", .. })
        ));

        let mut config = WorldConfig::default();
        config.observer.spawn_look = Vec3::Z;
        assert!(config.validate().is_err());

        let mut config = WorldConfig::default();
        config.fade.in_ticks = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { field: "fade.in_ticks", .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            WorldConfig::from_json_str("{ width: }"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = WorldConfig::load("/nonexistent/labyrinth.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
