use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest board the engine accepts
pub const MIN_BOARD_SIZE: usize = 4;

/// Largest board the engine accepts
pub const MAX_BOARD_SIZE: usize = 128;

/// Quantity that drives the speed-up of the tick interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedBasis {
    /// Every point of score shortens the interval by `speed_step_ms`
    Score,
    /// Every level above the first shortens the interval by `speed_step_ms`
    Level,
}

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Cells per side of the square board
    pub board_size: usize,
    /// Initial length of the snake
    pub initial_snake_length: usize,

    // Scoring
    /// Points awarded per food
    pub food_score: u32,
    /// Score needed per level
    pub level_threshold: u32,

    // Timing
    /// Tick interval at score 0
    pub base_interval_ms: u64,
    /// Interval reduction per unit of the speed basis
    pub speed_step_ms: u64,
    pub speed_basis: SpeedBasis,
    /// Interval never drops below this
    pub min_interval_ms: u64,

    // Overdrive
    /// Overdrive starts whenever the score crosses a multiple of this (0 disables)
    pub overdrive_threshold: u32,
    /// Ticks an Overdrive window lasts
    pub overdrive_ticks: u32,
    /// Extra interval reduction while Overdrive is active
    pub overdrive_bonus_ms: u64,
    /// Floor applied while Overdrive is active
    pub overdrive_min_interval_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: 20,
            initial_snake_length: 3,
            food_score: 10,
            level_threshold: 50,
            base_interval_ms: 120,
            speed_step_ms: 2,
            speed_basis: SpeedBasis::Score,
            min_interval_ms: 50,
            overdrive_threshold: 100,
            overdrive_ticks: 30,
            overdrive_bonus_ms: 20,
            overdrive_min_interval_ms: 35,
        }
    }
}

/// A configuration the engine refuses to run with
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board size {0} is too small (minimum 4)")]
    BoardTooSmall(usize),
    #[error("board size {0} is too large (maximum 128)")]
    BoardTooLarge(usize),
    #[error("level threshold must be greater than zero")]
    ZeroLevelThreshold,
    #[error("food score must be greater than zero")]
    ZeroFoodScore,
    #[error("initial snake length {length} does not fit on a board of size {board_size}")]
    SnakeDoesNotFit { length: usize, board_size: usize },
    #[error("minimum tick interval must be greater than zero")]
    ZeroMinInterval,
}

impl GameConfig {
    /// Create a new configuration with custom board size
    pub fn new(board_size: usize) -> Self {
        Self {
            board_size,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10)
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: GameConfig = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Ok(config)
    }

    /// Check the constraints the engine relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_size < MIN_BOARD_SIZE {
            return Err(ConfigError::BoardTooSmall(self.board_size));
        }
        if self.board_size > MAX_BOARD_SIZE {
            return Err(ConfigError::BoardTooLarge(self.board_size));
        }
        if self.level_threshold == 0 {
            return Err(ConfigError::ZeroLevelThreshold);
        }
        if self.food_score == 0 {
            return Err(ConfigError::ZeroFoodScore);
        }
        // The body is laid out to the left of the centre cell, head included
        let room = self.board_size / 2 + 1;
        if self.initial_snake_length == 0 || self.initial_snake_length > room {
            return Err(ConfigError::SnakeDoesNotFit {
                length: self.initial_snake_length,
                board_size: self.board_size,
            });
        }
        if self.min_interval_ms == 0 || self.overdrive_min_interval_ms == 0 {
            return Err(ConfigError::ZeroMinInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.board_size, 20);
        assert_eq!(config.initial_snake_length, 3);
        assert_eq!(config.food_score, 10);
        assert_eq!(config.base_interval_ms, 120);
        assert_eq!(config.min_interval_ms, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(15);
        assert_eq!(config.board_size, 15);
        assert_eq!(config.level_threshold, 50);
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(
            GameConfig::new(3).validate(),
            Err(ConfigError::BoardTooSmall(3))
        );

        let config = GameConfig {
            level_threshold: 0,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroLevelThreshold));

        let config = GameConfig {
            initial_snake_length: 12,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SnakeDoesNotFit { length: 12, .. })
        ));

        let config = GameConfig {
            min_interval_ms: 0,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroMinInterval));
    }

    #[test]
    fn test_board_size_limits() {
        assert!(GameConfig::new(MIN_BOARD_SIZE).validate().is_ok());
        assert!(GameConfig::new(MAX_BOARD_SIZE).validate().is_ok());
        assert_eq!(
            GameConfig::new(MAX_BOARD_SIZE + 1).validate(),
            Err(ConfigError::BoardTooLarge(MAX_BOARD_SIZE + 1))
        );
        assert_eq!(
            GameConfig::new(40_000).validate(),
            Err(ConfigError::BoardTooLarge(40_000))
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "board_size": 24, "speed_basis": "level" }"#).unwrap();
        assert_eq!(config.board_size, 24);
        assert_eq!(config.speed_basis, SpeedBasis::Level);
        assert_eq!(config.food_score, 10);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cobra.json");
        std::fs::write(&path, r#"{ "level_threshold": 30 }"#).unwrap();

        let config = GameConfig::from_json_file(&path).unwrap();
        assert_eq!(config.level_threshold, 30);
        assert!(GameConfig::from_json_file(&dir.path().join("missing.json")).is_err());
    }
}
