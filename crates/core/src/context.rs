//! Pipeline context
//!
//! The context is handed to every actor constructor. It exposes exactly two
//! capabilities: typed configuration lookup ([`ConfigGet`]) and fatal
//! failure reporting. A sink that exhausts its reconnect budget reports the
//! failure here instead of tearing the process down; the pipeline owner
//! decides what to do with it.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::{CoreError, Result};
use crate::value::Value;

/// Config key for the per-edge worker parallelism
pub const SYSTEM_MAXPROCS: &str = "system.maxprocs";

/// Typed configuration lookup over a hierarchical dot-path key space
pub trait ConfigGet: Send + Sync {
    /// Look up a key like `system.maxprocs`
    fn get(&self, key: &str) -> Option<Value>;
}

/// A terminal actor failure reported to the pipeline supervisor
#[derive(Debug)]
pub struct FatalFailure {
    /// Name of the failed actor
    pub actor: String,
    /// What went wrong
    pub error: CoreError,
}

/// Shared pipeline context
pub struct Context {
    config: Arc<dyn ConfigGet>,
    failure_tx: mpsc::UnboundedSender<FatalFailure>,
}

impl Context {
    /// Create a context over a configuration source
    ///
    /// Returns the context together with the receiving end of the fatal
    /// failure channel; the pipeline keeps the receiver.
    pub fn new(config: Arc<dyn ConfigGet>) -> (Arc<Self>, mpsc::UnboundedReceiver<FatalFailure>) {
        let (failure_tx, failure_rx) = mpsc::unbounded_channel();
        (Arc::new(Self { config, failure_tx }), failure_rx)
    }

    /// Look up a configuration value
    #[inline]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.config.get(key)
    }

    /// The configured worker parallelism (`system.maxprocs`)
    pub fn maxprocs(&self) -> Result<usize> {
        let value = self.get(SYSTEM_MAXPROCS).ok_or(CoreError::MissingConfig {
            key: SYSTEM_MAXPROCS.to_owned(),
        })?;
        match value.as_int() {
            Some(n) if n > 0 => Ok(n as usize),
            _ => Err(CoreError::MissingConfig {
                key: SYSTEM_MAXPROCS.to_owned(),
            }),
        }
    }

    /// Report a terminal actor failure to the pipeline supervisor
    ///
    /// Dropped silently if the pipeline has already gone away.
    pub fn report_fatal(&self, actor: &str, error: CoreError) {
        tracing::error!(actor = %actor, error = %error, "actor reported fatal failure");
        let _ = self.failure_tx.send(FatalFailure {
            actor: actor.to_owned(),
            error,
        });
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context").finish_non_exhaustive()
    }
}
