use thiserror::Error;

/// Errors raised by the agent and its learner
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgentError {
    /// Hyperparameters failed validation
    #[error("invalid agent configuration: {0}")]
    InvalidConfig(String),

    /// A learning update was requested without any transitions
    #[error("cannot train on an empty batch")]
    EmptyBatch,

    /// Tensor data could not be read back
    #[error("tensor conversion failed: {0}")]
    Tensor(String),
}
