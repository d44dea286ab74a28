// Error types shared by the engine, the loader and configuration.

use thiserror::Error;

use crate::engine::lifecycle::LifecycleState;

/// Errors surfaced by the round lifecycle and the game server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Every candidate failed asset resolution. Fatal for the session.
    #[error("no playable candidates: every image failed to resolve")]
    NoPlayableCandidates,
    /// An operation was invoked in a state that does not accept it.
    /// State is left untouched.
    #[error("cannot {op} while {state}")]
    InvalidTransition {
        op: &'static str,
        state: LifecycleState,
    },
    /// The game server task has stopped.
    #[error("game server is closed")]
    ServerClosed,
}

/// Errors produced while loading a candidate file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read candidate file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed candidate data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("candidate file contains no usable entries")]
    Empty,
}

/// Errors produced while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown game mode '{0}' (expected trait, tactician or augment)")]
    UnknownMode(String),
    #[error("invalid value '{value}' for {key}")]
    InvalidNumber { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_display() {
        let err = GameError::InvalidTransition {
            op: "guess",
            state: LifecycleState::Finished,
        };
        assert_eq!(err.to_string(), "cannot guess while finished");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::UnknownMode("champions".into());
        assert!(err.to_string().contains("champions"));

        let err = ConfigError::InvalidNumber {
            key: "--seconds",
            value: "abc".into(),
        };
        assert_eq!(err.to_string(), "invalid value 'abc' for --seconds");
    }
}
