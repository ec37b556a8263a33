//! Q-learning agent hyperparameter configuration

use serde::{Deserialize, Serialize};

/// Configuration for the Q-learning agent
///
/// # Example
///
/// ```rust
/// use snake_qlearning::rl::AgentConfig;
///
/// // Use default hyperparameters
/// let config = AgentConfig::default();
///
/// // Or customize specific parameters
/// let config = AgentConfig {
///     hidden_size: 128,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Learning rate for the Adam optimizer
    ///
    /// Default: 0.001
    pub learning_rate: f64,

    /// Discount factor for future rewards (gamma)
    ///
    /// Default: 0.9
    pub gamma: f32,

    /// Maximum number of transitions kept in replay memory
    ///
    /// Default: 100_000
    pub memory_capacity: usize,

    /// Number of transitions sampled for a long-memory update
    ///
    /// Default: 1000
    pub batch_size: usize,

    /// Exploration threshold before any game has been played
    ///
    /// Epsilon is `exploration_base - n_games`; a random action is taken when
    /// a draw from `[0, exploration_range)` falls below it.
    ///
    /// Default: 80
    pub exploration_base: u32,

    /// Upper bound (exclusive) of the exploration draw
    ///
    /// Default: 200
    pub exploration_range: u32,

    /// Width of the hidden layer
    ///
    /// Default: 256
    pub hidden_size: usize,
}

impl AgentConfig {
    /// Create a new configuration with default hyperparameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration parameters
    ///
    /// # Returns
    ///
    /// `Ok(())` if all parameters are valid, `Err(String)` with an error message otherwise.
    pub fn validate(&self) -> Result<(), String> {
        if self.learning_rate <= 0.0 {
            return Err(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            ));
        }

        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1], got {}", self.gamma));
        }

        if self.memory_capacity == 0 {
            return Err("memory_capacity must be at least 1".to_string());
        }

        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".to_string());
        }

        if self.exploration_range == 0 {
            return Err("exploration_range must be at least 1".to_string());
        }

        if self.hidden_size == 0 {
            return Err("hidden_size must be at least 1".to_string());
        }

        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            gamma: 0.9,
            memory_capacity: 100_000,
            batch_size: 1000,
            exploration_base: 80,
            exploration_range: 200,
            hidden_size: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert_eq!(config.learning_rate, 0.001);
        assert_eq!(config.gamma, 0.9);
        assert_eq!(config.memory_capacity, 100_000);
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.exploration_base, 80);
        assert_eq!(config.exploration_range, 200);
        assert_eq!(config.hidden_size, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_new_creates_default() {
        assert_eq!(AgentConfig::new(), AgentConfig::default());
    }

    #[test]
    fn test_validation_negative_learning_rate() {
        let mut config = AgentConfig::default();
        config.learning_rate = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_gamma_out_of_range() {
        let mut config = AgentConfig::default();
        config.gamma = 1.5;
        assert!(config.validate().is_err());

        config.gamma = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_sizes() {
        let mut config = AgentConfig::default();
        config.memory_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = AgentConfig::default();
        config.batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = AgentConfig::default();
        config.hidden_size = 0;
        assert!(config.validate().is_err());

        let mut config = AgentConfig::default();
        config.exploration_range = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let config = AgentConfig {
            hidden_size: 64,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let restored: AgentConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, config);
    }
}
