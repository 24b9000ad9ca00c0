//! Cobra - a terminal Snake game
//!
//! This library provides:
//! - Core game logic: grid, snake, food, tick clock and the engine state machine (game module)
//! - Key mapping (input module)
//! - Best-score storage (persistence module)
//! - TUI rendering (render module)
//! - Session statistics (metrics module)
//! - The interactive terminal driver (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod persistence;
pub mod render;
