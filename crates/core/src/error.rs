//! Core error types
//!
//! One error enum shared by the message, actor and context layers.
//! Build-time configuration errors live in `flowd-pipeline`; message-level
//! outcomes (Failed, Unroutable, ...) are never errors - they travel as the
//! message's terminal status.

use thiserror::Error;

/// Core runtime errors
#[derive(Debug, Error)]
pub enum CoreError {
    /// Second completion attempt on a message
    #[error("message has been completed before")]
    AlreadyCompleted,

    /// Connect called on a terminal actor
    #[error("actor {actor:?} can not connect to other actors")]
    NotConnectable { actor: String },

    /// Start called on an already started actor
    #[error("actor {actor:?} is already started")]
    AlreadyStarted { actor: String },

    /// Stop called before start
    #[error("actor {actor:?} has not been started")]
    NotStarted { actor: String },

    /// Start or stop called on a stopped actor
    #[error("actor {actor:?} is already stopped")]
    AlreadyStopped { actor: String },

    /// Receive called on an actor whose queues are closed
    #[error("actor {actor:?} queue is closed")]
    QueueClosed { actor: String },

    /// Required actor parameter is missing
    #[error("actor {actor:?} is missing required parameter {param:?}")]
    MissingParam { actor: String, param: String },

    /// Actor parameter has the wrong type or an invalid value
    #[error("actor {actor:?} parameter {param:?} is invalid: {reason}")]
    InvalidParam {
        actor: String,
        param: String,
        reason: String,
    },

    /// Required configuration key is missing
    #[error("missing required config key {key:?}")]
    MissingConfig { key: String },

    /// Sink gave up reconnecting after the configured retry cap
    #[error("sink {actor:?} gave up reconnecting after {retries} retries")]
    ReconnectExhausted { actor: String, retries: usize },

    /// IO error from a head or receiver
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::AlreadyCompleted;
        assert!(err.to_string().contains("completed before"));

        let err = CoreError::NotConnectable {
            actor: "out".into(),
        };
        assert!(err.to_string().contains("\"out\""));

        let err = CoreError::MissingParam {
            actor: "udp_in".into(),
            param: "bind_addr".into(),
        };
        assert!(err.to_string().contains("bind_addr"));

        let err = CoreError::ReconnectExhausted {
            actor: "out".into(),
            retries: 3,
        };
        assert!(err.to_string().contains("3 retries"));
    }
}
