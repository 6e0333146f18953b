//! Configuration error types

use std::io;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("failed to read config file '{path}': {source}")]
    IoError {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error - connect list references an actor that does not exist
    #[error("actor '{actor}' connects to unknown peer '{peer}'")]
    UnknownPeer {
        /// Actor carrying the connect entry
        actor: String,
        /// Name of the missing peer
        peer: String,
    },

    /// Validation error - actor module name is malformed
    #[error("actor '{actor}' has invalid module name '{module}': {message}")]
    InvalidModule {
        /// Name of the actor
        actor: String,
        /// The offending module name
        module: String,
        /// What is wrong with it
        message: String,
    },

    /// No actors configured
    #[error("no actors are configured - at least one actor is required")]
    NoActors,
}

impl ConfigError {
    /// Create an UnknownPeer error
    pub fn unknown_peer(actor: impl Into<String>, peer: impl Into<String>) -> Self {
        Self::UnknownPeer {
            actor: actor.into(),
            peer: peer.into(),
        }
    }

    /// Create an InvalidModule error
    pub fn invalid_module(
        actor: impl Into<String>,
        module: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidModule {
            actor: actor.into(),
            module: module.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_peer_error() {
        let err = ConfigError::unknown_peer("router", "missing_sink");
        assert!(err.to_string().contains("router"));
        assert!(err.to_string().contains("missing_sink"));
    }

    #[test]
    fn test_invalid_module_error() {
        let err = ConfigError::invalid_module("in", "", "module name is empty");
        assert!(err.to_string().contains("'in'"));
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_no_actors_error() {
        let err = ConfigError::NoActors;
        assert!(err.to_string().contains("no actors"));
    }
}
