//! Router - metadata-driven single-destination dispatch
//!
//! The router forwards each message to exactly one named peer, chosen by
//! the `sendto` metadata entry. A message naming a peer no edge exists for
//! is completed `Unroutable` on the spot - that is a terminal outcome for
//! the message, not a router fault, so `receive` still returns `Ok`.
//!
//! # Ordering
//!
//! FIFO order to a single peer holds with a worker pool of 1; larger pools
//! trade ordering for throughput.

use std::sync::Arc;

use async_trait::async_trait;

use flowd_core::{Actor, Constructor, Context, Lifecycle, Message, Params, Result, Status};

use crate::outbound::{complete_quietly, edge_queue_size, Outbound};

/// Metadata key naming the destination peer
pub const META_SENDTO: &str = "sendto";

/// Single-key dispatch actor
pub struct Router {
    name: String,
    out: Outbound,
    lifecycle: Lifecycle,
}

impl Router {
    /// Registry constructor for `core.router`
    pub fn build(name: &str, ctx: Arc<Context>, params: &Params) -> Result<Arc<dyn Actor>> {
        Ok(Arc::new(Self {
            name: name.to_owned(),
            out: Outbound::new(name, edge_queue_size(&ctx, params)),
            lifecycle: Lifecycle::new(),
        }))
    }

    /// Number of distinct routable peers
    pub fn route_count(&self) -> usize {
        self.out.len()
    }
}

// Matches the registry constructor shape.
const _: Constructor = Router::build;

#[async_trait]
impl Actor for Router {
    fn name(&self) -> &str {
        &self.name
    }

    async fn connect(&self, parallelism: usize, peer: Arc<dyn Actor>) -> Result<()> {
        self.out.connect(parallelism, peer);
        Ok(())
    }

    async fn receive(&self, msg: Message) -> Result<()> {
        let destination = msg.meta(META_SENDTO).and_then(|v| v.as_str().map(String::from));

        let Some(destination) = destination else {
            tracing::debug!(actor = %self.name, "message carries no routing key");
            complete_quietly(&self.name, &msg, Status::Unroutable);
            return Ok(());
        };

        // Senders are cloned under the same lock discipline `connect`
        // mutates the map with; the guard is gone before the enqueue blocks.
        match self.out.sender(&destination) {
            Some(tx) => tx.send(msg).await.map_err(|_| {
                flowd_core::CoreError::QueueClosed {
                    actor: self.name.clone(),
                }
            }),
            None => {
                tracing::debug!(
                    actor = %self.name,
                    destination = %destination,
                    "no route for destination"
                );
                complete_quietly(&self.name, &msg, Status::Unroutable);
                Ok(())
            }
        }
    }

    async fn start(&self) -> Result<()> {
        self.lifecycle.start(&self.name)?;
        tracing::info!(actor = %self.name, routes = self.route_count(), "router started");
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.lifecycle.stop(&self.name)?;
        self.out.close();
        tracing::info!(actor = %self.name, "router stopped");
        Ok(())
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("name", &self.name)
            .field("routes", &self.route_count())
            .finish()
    }
}

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;
