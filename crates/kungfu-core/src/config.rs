//! Simulation configuration.
//!
//! Every field has a default matching the classic game, so a partial JSON
//! document only needs to name what it overrides:
//!
//! ```
//! use kungfu_core::config::SimConfig;
//!
//! let config = SimConfig::from_json_str(r#"{ "timing": { "cooldown_ms": 500 } }"#).unwrap();
//! assert_eq!(config.timing.cooldown_ms, 500);
//! assert_eq!(config.timing.long_rest_ms, 3000);
//! assert_eq!(config.board.rows, 8);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::BoardGeometry;
use crate::Millis;

/// Errors raised while loading or validating a [`SimConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration document is not valid JSON for [`SimConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is outside its allowed range.
    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

/// Timing parameters for movement, cooldown and rest states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Movement speed in cells per second.
    pub move_speed: f32,
    /// Duration of a jump-in-place animation.
    pub jump_duration_ms: Millis,
    /// Minimum time between two accepted actions of the same piece.
    pub cooldown_ms: Millis,
    /// Rest after a completed move.
    pub long_rest_ms: Millis,
    /// Rest after a completed jump.
    pub short_rest_ms: Millis,
    /// Rest gate on the jump state itself.
    pub jump_rest_ms: Millis,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            move_speed: 4.0,
            jump_duration_ms: 1500,
            cooldown_ms: 2000,
            long_rest_ms: 3000,
            short_rest_ms: 2000,
            jump_rest_ms: 1500,
        }
    }
}

/// Sprite animation parameters shared by all states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Frames per second.
    pub fps: f32,
    /// Whether animations wrap around or hold the last frame.
    pub looping: bool,
    /// Number of frames per state animation.
    pub frame_count: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            fps: 6.0,
            looping: true,
            frame_count: 1,
        }
    }
}

/// Top-level configuration for a [`crate::simulation::Simulation`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Board dimensions and cell size.
    pub board: BoardGeometry,
    /// Movement, cooldown and rest timing.
    pub timing: TimingConfig,
    /// Animation bookkeeping.
    pub animation: AnimationConfig,
}

impl SimConfig {
    /// Parses and validates a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed JSON and
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`SimConfig::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks that every value is usable by the simulation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });

        if self.board.rows <= 0 {
            return invalid("board.rows", "must be positive");
        }
        if self.board.cols <= 0 {
            return invalid("board.cols", "must be positive");
        }
        if self.board.cell_width <= 0 || self.board.cell_height <= 0 {
            return invalid("board.cell_width", "cell size must be positive");
        }
        if !(self.timing.move_speed.is_finite() && self.timing.move_speed > 0.0) {
            return invalid("timing.move_speed", "must be a positive number");
        }
        if !(self.animation.fps.is_finite() && self.animation.fps > 0.0) {
            return invalid("animation.fps", "must be a positive number");
        }
        if self.animation.frame_count == 0 {
            return invalid("animation.frame_count", "must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod defaults_tests {
        use super::*;

        #[test]
        fn defaults_match_classic_timing() {
            let config = SimConfig::default();
            assert!((config.timing.move_speed - 4.0).abs() < f32::EPSILON);
            assert_eq!(config.timing.cooldown_ms, 2000);
            assert_eq!(config.timing.jump_duration_ms, 1500);
            assert_eq!(config.timing.long_rest_ms, 3000);
            assert_eq!(config.timing.short_rest_ms, 2000);
            assert_eq!(config.board, BoardGeometry::STANDARD);
        }

        #[test]
        fn defaults_validate() {
            assert!(SimConfig::default().validate().is_ok());
        }
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn empty_document_gives_defaults() {
            let config = SimConfig::from_json_str("{}").unwrap();
            assert_eq!(config, SimConfig::default());
        }

        #[test]
        fn partial_board_override() {
            let config = SimConfig::from_json_str(r#"{ "board": { "rows": 10 } }"#).unwrap();
            assert_eq!(config.board.rows, 10);
            assert_eq!(config.board.cols, 8);
        }

        #[test]
        fn serde_roundtrip() {
            let mut config = SimConfig::default();
            config.timing.cooldown_ms = 750;
            config.animation.looping = false;

            let json = serde_json::to_string(&config).unwrap();
            let restored = SimConfig::from_json_str(&json).unwrap();
            assert_eq!(config, restored);
        }

        #[test]
        fn malformed_json_is_parse_error() {
            let err = SimConfig::from_json_str("{ not json").unwrap_err();
            assert!(matches!(err, ConfigError::Parse(_)));
        }

        #[test]
        fn zero_speed_rejected() {
            let err = SimConfig::from_json_str(r#"{ "timing": { "move_speed": 0.0 } }"#).unwrap_err();
            assert!(matches!(
                err,
                ConfigError::Invalid {
                    field: "timing.move_speed",
                    ..
                }
            ));
        }

        #[test]
        fn zero_rows_rejected() {
            let err = SimConfig::from_json_str(r#"{ "board": { "rows": 0 } }"#).unwrap_err();
            assert!(err.to_string().contains("board.rows"));
        }

        #[test]
        fn missing_file_is_io_error() {
            let err = SimConfig::from_json_file("/definitely/not/here.json").unwrap_err();
            assert!(matches!(err, ConfigError::Io(_)));
        }
    }
}
