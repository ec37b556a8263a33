//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! It is driven identically by the training loop and by the interactive frontends.

pub mod action;
pub mod config;
pub mod engine;
pub mod error;
pub mod state;

// Re-export commonly used types
pub use action::{Action, Direction};
pub use config::GameConfig;
pub use engine::{Environment, StepOutcome, TerminalCause};
pub use error::GameError;
pub use state::{GameState, Position, Snake};
