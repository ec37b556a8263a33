//! Orchestrators built on the shared environment and agent

pub mod human;
pub mod terminal;
pub mod train;
pub mod watch;

pub use human::HumanMode;
pub use train::{MODEL_FILE_NAME, TrainConfig, TrainMode, validate_config};
pub use watch::{PlaybackRate, WatchMode};
