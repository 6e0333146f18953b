//! Outbound links - per-peer queues and worker pools
//!
//! Every non-terminal actor owns an [`Outbound`]: a map of peer name to a
//! bounded handoff queue, each drained by a pool of worker tasks that call
//! `peer.receive`. Connecting the same peer twice reuses the queue and adds
//! workers to the pool.
//!
//! The link map is guarded by a `RwLock`; `connect` takes the write guard,
//! the message path takes a read guard and drops it before enqueueing, so
//! the lock is never held across an await.

use std::collections::HashMap;
use std::sync::Arc;

use crossfire::{MAsyncRx, MAsyncTx};
use parking_lot::RwLock;

use flowd_core::{Actor, Context, CoreError, Message, Params, Result, Status};

/// Default per-edge queue capacity when neither the actor params nor the
/// system config specify one
const DEFAULT_QUEUE_SIZE: usize = 64;

/// One outbound edge: the send side plus a handle to the shared receive
/// side, kept so later `connect` calls can add workers to the same queue.
struct Link {
    tx: MAsyncTx<Message>,
    rx: MAsyncRx<Message>,
}

/// Per-peer outbound queues with worker pools
pub struct Outbound {
    /// Owning actor name, for logging
    owner: String,

    /// Capacity of newly created per-peer queues
    queue_size: usize,

    /// Peer name -> live edge
    links: RwLock<HashMap<String, Link>>,
}

impl Outbound {
    /// Create an empty link set for `owner`
    pub fn new(owner: impl Into<String>, queue_size: usize) -> Self {
        Self {
            owner: owner.into(),
            queue_size: queue_size.max(1),
            links: RwLock::new(HashMap::new()),
        }
    }

    /// Number of distinct connected peers
    pub fn len(&self) -> usize {
        self.links.read().len()
    }

    /// Whether any peer is connected
    pub fn is_empty(&self) -> bool {
        self.links.read().is_empty()
    }

    /// Establish (or extend) the edge to `peer`
    ///
    /// Creates the per-peer queue on first sight of the peer name and spawns
    /// `parallelism` workers draining it. Worker errors from `peer.receive`
    /// are logged and skipped - the peer owns the message outcome.
    pub fn connect(&self, parallelism: usize, peer: Arc<dyn Actor>) {
        let peername = peer.name().to_owned();
        let rx = {
            let mut links = self.links.write();
            let link = links.entry(peername.clone()).or_insert_with(|| {
                let (tx, rx) = crossfire::mpmc::bounded_async(self.queue_size);
                Link { tx, rx }
            });
            link.rx.clone()
        };

        tracing::debug!(
            actor = %self.owner,
            peer = %peername,
            workers = parallelism,
            "connected outbound edge"
        );

        for _ in 0..parallelism.max(1) {
            let rx = rx.clone();
            let peer = Arc::clone(&peer);
            let owner = self.owner.clone();
            tokio::spawn(async move {
                while let Ok(msg) = rx.recv().await {
                    if let Err(e) = peer.receive(msg).await {
                        tracing::error!(
                            actor = %owner,
                            peer = %peer.name(),
                            error = %e,
                            "peer rejected message"
                        );
                    }
                }
            });
        }
    }

    /// Clone the send side of the edge to `peer`, if connected
    pub fn sender(&self, peer: &str) -> Option<MAsyncTx<Message>> {
        self.links.read().get(peer).map(|link| link.tx.clone())
    }

    /// Enqueue a message for a named peer, blocking on a full queue
    pub async fn send(&self, peer: &str, msg: Message) -> Result<()> {
        let tx = self.sender(peer).ok_or_else(|| CoreError::QueueClosed {
            actor: self.owner.clone(),
        })?;
        tx.send(msg).await.map_err(|_| CoreError::QueueClosed {
            actor: self.owner.clone(),
        })
    }

    /// Forward a message through the connected edges
    ///
    /// - No peers: the message is completed `Unroutable`.
    /// - One peer: the original message is enqueued (its completion stays
    ///   with the downstream path).
    /// - Several peers: each gets an independent [`Message::copy`]; the
    ///   original completes `Done` when every enqueue succeeded,
    ///   `PartialSend` when only some did, `Failed` when none did.
    pub async fn dispatch(&self, msg: Message) -> Result<()> {
        let links: Vec<(String, MAsyncTx<Message>)> = {
            let links = self.links.read();
            links
                .iter()
                .map(|(name, link)| (name.clone(), link.tx.clone()))
                .collect()
        };

        match links.len() {
            0 => {
                tracing::warn!(actor = %self.owner, "no outbound peers, message is unroutable");
                complete_quietly(&self.owner, &msg, Status::Unroutable);
                Ok(())
            }
            1 => {
                let (_, tx) = &links[0];
                tx.send(msg).await.map_err(|_| CoreError::QueueClosed {
                    actor: self.owner.clone(),
                })
            }
            _ => {
                let mut sent = 0usize;
                for (peername, tx) in &links {
                    if tx.send(msg.copy()).await.is_ok() {
                        sent += 1;
                    } else {
                        tracing::warn!(
                            actor = %self.owner,
                            peer = %peername,
                            "outbound queue closed, branch skipped"
                        );
                    }
                }
                let status = if sent == links.len() {
                    Status::Done
                } else if sent > 0 {
                    Status::PartialSend
                } else {
                    Status::Failed
                };
                complete_quietly(&self.owner, &msg, status);
                Ok(())
            }
        }
    }

    /// Drop every queue so workers drain and exit
    pub fn close(&self) {
        self.links.write().clear();
    }
}

/// Complete a message, tracing (not failing) a completion race
pub(crate) fn complete_quietly(actor: &str, msg: &Message, status: Status) {
    if msg.complete(status).is_err() {
        tracing::trace!(
            actor = %actor,
            status = %status,
            "message was already completed"
        );
    }
}

/// Resolve the per-edge queue capacity for an actor
///
/// Order of precedence: `queue_size` actor param, `system.queue_size`
/// config key, built-in default.
pub(crate) fn edge_queue_size(ctx: &Context, params: &Params) -> usize {
    params
        .get("queue_size")
        .and_then(|v| v.as_int())
        .or_else(|| ctx.get("system.queue_size").and_then(|v| v.as_int()))
        .map(|n| n.max(1) as usize)
        .unwrap_or(DEFAULT_QUEUE_SIZE)
}

#[cfg(test)]
#[path = "outbound_test.rs"]
mod outbound_test;
