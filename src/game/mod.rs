//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The only timing primitive is the [`SimulationClock`], which the driver awaits
//! before calling [`GameEngine::tick`].

pub mod action;
pub mod clock;
pub mod config;
pub mod engine;
pub mod food;
pub mod grid;
pub mod snake;
pub mod state;

// Re-export commonly used types
pub use action::{Command, Direction};
pub use clock::{SimulationClock, TickSchedule};
pub use config::{ConfigError, GameConfig, MAX_BOARD_SIZE, MIN_BOARD_SIZE, SpeedBasis};
pub use engine::{EngineEvent, GameEngine};
pub use food::FoodSpawner;
pub use grid::{Cell, Grid};
pub use snake::Snake;
pub use state::{CollisionKind, GameOutcome, GamePhase, Snapshot};
