//! Actor contract
//!
//! Every pipeline node - receiver, router, fanout, throttler, sink -
//! implements [`Actor`]. The pipeline wires nodes together with `connect`
//! (one call per configured edge), then drives `start` in dependency order
//! and `stop` in reverse.
//!
//! Errors from `receive` are synchronous rejection only (actor stopped,
//! actor can not accept connections). Once a message is queued, its outcome
//! travels exclusively through [`crate::Message::complete`] - never through
//! a return value to the original sender.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::context::Context;
use crate::error::{CoreError, Result};
use crate::message::Message;
use crate::value::Params;

/// A named, independently lifecycled pipeline node
#[async_trait]
pub trait Actor: Send + Sync {
    /// Actor name, unique within a pipeline
    fn name(&self) -> &str;

    /// Establish (or reuse) an outbound edge to `peer`
    ///
    /// Spins up `parallelism` worker tasks that drain a dedicated per-peer
    /// queue and invoke `peer.receive`. Must be called before `start` for
    /// the edge to be live. Terminal actors return
    /// [`CoreError::NotConnectable`].
    async fn connect(&self, parallelism: usize, peer: Arc<dyn Actor>) -> Result<()>;

    /// Accept a message for processing or forwarding
    ///
    /// Blocking on a full downstream queue is expected (backpressure is
    /// visible to the caller as an await).
    async fn receive(&self, msg: Message) -> Result<()>;

    /// Start processing
    async fn start(&self) -> Result<()>;

    /// Stop processing and release all resources
    ///
    /// Closes queues and joins workers such that no worker task outlives
    /// the actor.
    async fn stop(&self) -> Result<()>;
}

impl std::fmt::Debug for dyn Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Actor").field("name", &self.name()).finish()
    }
}

/// Constructor shape shared by the built-in registry and external resolvers
pub type Constructor = fn(&str, Arc<Context>, &Params) -> Result<Arc<dyn Actor>>;

/// Lifecycle phase of an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Constructed,
    Started,
    Stopped,
}

/// Start/stop gate shared by all actors
///
/// Policy: duplicate `start` and `stop` calls, and `stop` before `start`,
/// are explicit errors rather than no-ops, so ordering bugs in the
/// orchestration surface instead of being swallowed.
#[derive(Debug)]
pub struct Lifecycle {
    phase: Mutex<Phase>,
}

impl Lifecycle {
    /// Create a lifecycle gate in the constructed phase
    pub fn new() -> Self {
        Self {
            phase: Mutex::new(Phase::Constructed),
        }
    }

    /// Transition constructed -> started
    pub fn start(&self, actor: &str) -> Result<()> {
        let mut phase = self.phase.lock();
        match *phase {
            Phase::Constructed => {
                *phase = Phase::Started;
                Ok(())
            }
            Phase::Started => Err(CoreError::AlreadyStarted {
                actor: actor.to_owned(),
            }),
            Phase::Stopped => Err(CoreError::AlreadyStopped {
                actor: actor.to_owned(),
            }),
        }
    }

    /// Transition started -> stopped (terminal)
    pub fn stop(&self, actor: &str) -> Result<()> {
        let mut phase = self.phase.lock();
        match *phase {
            Phase::Started => {
                *phase = Phase::Stopped;
                Ok(())
            }
            Phase::Constructed => Err(CoreError::NotStarted {
                actor: actor.to_owned(),
            }),
            Phase::Stopped => Err(CoreError::AlreadyStopped {
                actor: actor.to_owned(),
            }),
        }
    }

    /// Whether the actor is currently started
    #[inline]
    pub fn is_started(&self) -> bool {
        *self.phase.lock() == Phase::Started
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
