//! Snake Q-learning - a Snake game and a deep Q-learning agent that learns it
//!
//! This library provides:
//! - Core game simulation with relative actions (game module)
//! - Observation encoding, replay memory, Q-network and agent (rl module)
//! - Training statistics and session metrics (metrics module)
//! - Training, human play and watch modes (modes module)
//! - TUI rendering and keyboard input (render and input modules)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod rl;
