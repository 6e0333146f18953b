//! Pipeline assembly and orchestration errors

use thiserror::Error;

/// Errors raised while building or driving a pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The config names a module no registered constructor matches
    #[error("actor {actor:?} uses unknown module {module:?}")]
    UnknownModule { actor: String, module: String },

    /// A connection references an actor the config never defines
    #[error("actor {actor:?} connects to unknown peer {peer:?}")]
    UnknownPeer { actor: String, peer: String },

    /// The connection graph is not a DAG
    #[error("actor graph contains a cycle through {actor:?}")]
    CycleDetected { actor: String },

    /// An actor failed to construct, start or stop
    #[error(transparent)]
    Actor(#[from] flowd_core::CoreError),

    /// Config-level validation failure
    #[error(transparent)]
    Config(#[from] flowd_config::ConfigError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
