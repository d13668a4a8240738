//! Error types.

use std::path::PathBuf;

/// Errors raised by maze construction and grid queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MazeError {
    /// Width or height below one room.
    #[error("maze must be at least 1x1 rooms, got {width}x{height}")]
    InvalidDimensions {
        /// Requested rooms along X.
        width: u32,
        /// Requested rooms along Y.
        height: u32,
    },

    /// Width or height above the supported maximum.
    #[error("maze of {width}x{height} rooms exceeds the limit of {max} rooms per side")]
    DimensionsTooLarge {
        /// Requested rooms along X.
        width: u32,
        /// Requested rooms along Y.
        height: u32,
        /// Maximum rooms per side.
        max: u32,
    },

    /// A tile query outside the grid.
    #[error("tile ({x}, {y}) is outside the {width}x{height} grid")]
    TileOutOfBounds {
        /// Queried X.
        x: i64,
        /// Queried Y.
        y: i64,
        /// Grid width in tiles.
        width: usize,
        /// Grid height in tiles.
        height: usize,
    },
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Config JSON is malformed.
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A tuning value is out of range.
    #[error("invalid config value `{field}`: {reason}")]
    Validation {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Maze dimensions rejected.
    #[error(transparent)]
    Maze(#[from] MazeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MazeError::InvalidDimensions { width: 0, height: 3 };
        assert_eq!(err.to_string(), "maze must be at least 1x1 rooms, got 0x3");

        let err = MazeError::TileOutOfBounds { x: -1, y: 2, width: 5, height: 5 };
        assert_eq!(err.to_string(), "tile (-1, 2) is outside the 5x5 grid");
    }

    #[test]
    fn test_maze_error_converts_to_config_error() {
        let err: ConfigError = MazeError::InvalidDimensions { width: 0, height: 0 }.into();
        assert!(matches!(err, ConfigError::Maze(_)));
    }
}
