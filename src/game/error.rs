use thiserror::Error;

/// Errors raised by the simulator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Action vector is not a valid one-hot encoding
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// No free cell left to place the target on
    #[error("no free cell left for the target on a {cells}-cell grid")]
    GridFull { cells: usize },

    /// Configuration failed validation
    #[error("invalid game configuration: {0}")]
    InvalidConfig(String),

    /// `step` called on a finished episode without a `reset`
    #[error("episode is over, reset the environment before stepping")]
    EpisodeOver,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GameError::InvalidAction("no active element".to_string());
        assert_eq!(err.to_string(), "invalid action: no active element");

        let err = GameError::GridFull { cells: 4 };
        assert!(err.to_string().contains("4-cell grid"));
    }
}
