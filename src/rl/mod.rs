//! Deep Q-learning for the Snake game
//!
//! Provides:
//! - 11-feature observations of the snake's surroundings
//! - Bounded experience replay memory
//! - A two-layer Q-value network and its one-step TD learner
//! - The epsilon-greedy agent tying them together
//! - Checkpoint persistence

pub mod agent;
pub mod backend;
pub mod config;
pub mod error;
pub mod learner;
pub mod memory;
pub mod network;
pub mod observation;
pub mod persistence;

pub use agent::{Agent, argmax};
pub use backend::{InferenceBackend, TrainingBackend, default_device};
pub use config::AgentConfig;
pub use error::AgentError;
pub use learner::{QLearner, td_targets};
pub use memory::{ReplayMemory, Transition};
pub use network::{QNetwork, QNetworkConfig, QNetworkRecord};
pub use observation::{OBSERVATION_SIZE, Observation, create_observation};
pub use persistence::{ModelMetadata, load_agent, load_network, save_model};
