//! Error types for the siege simulation.
//!
//! Invalid targets (dead or despawned entities) are deliberately absent:
//! those are resolved as silent no-ops inside the tick. Only configuration
//! problems and rejected player actions surface as errors.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all simulation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// A unit or enemy kind has no stats entry in the balance tables.
    #[error("Missing configuration for {kind} '{key}'")]
    MissingConfig {
        /// Table the entry was expected in ("unit" or "enemy").
        kind: &'static str,
        /// Name of the missing key.
        key: String,
    },

    /// Configuration values are present but unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration text failed to parse.
    #[error("Failed to parse {what}: {message}")]
    ConfigParse {
        /// What was being parsed.
        what: &'static str,
        /// Parser message.
        message: String,
    },

    /// Insufficient resources.
    #[error("Insufficient resources: need {required} {resource}, have {available}")]
    InsufficientResources {
        /// Resource type.
        resource: &'static str,
        /// Amount required.
        required: u32,
        /// Amount available.
        available: u32,
    },

    /// The castle cannot be levelled any further.
    #[error("Castle already at max level {0}")]
    MaxLevelReached(u32),

    /// A wave is still spawning or waiting to be cleared.
    #[error("Wave {0} is still in progress")]
    WaveInProgress(u32),

    /// Invalid entity reference.
    #[error("Entity not found: {0}")]
    EntityNotFound(u64),

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GameError::InsufficientResources {
            resource: "gold",
            required: 50,
            available: 20,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient resources: need 50 gold, have 20"
        );

        let err = GameError::MissingConfig {
            kind: "enemy",
            key: "Troll".to_string(),
        };
        assert_eq!(err.to_string(), "Missing configuration for enemy 'Troll'");
    }
}
