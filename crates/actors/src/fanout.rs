//! Fanout - replicate each message to every connected peer
//!
//! With one peer the original message passes straight through. With
//! several, each peer gets an independent copy and the original's
//! completion aggregates the enqueue results: `Done` when every copy was
//! queued, `PartialSend` for a partial success, `Failed` when no peer
//! accepted it.

use std::sync::Arc;

use async_trait::async_trait;

use flowd_core::{Actor, Constructor, Context, Lifecycle, Message, Params, Result};

use crate::outbound::{edge_queue_size, Outbound};

pub struct Fanout {
    name: String,
    out: Outbound,
    lifecycle: Lifecycle,
}

impl Fanout {
    /// Registry constructor for `core.fanout`
    pub fn build(name: &str, ctx: Arc<Context>, params: &Params) -> Result<Arc<dyn Actor>> {
        Ok(Arc::new(Self {
            name: name.to_owned(),
            out: Outbound::new(name, edge_queue_size(&ctx, params)),
            lifecycle: Lifecycle::new(),
        }))
    }
}

// Matches the registry constructor shape.
const _: Constructor = Fanout::build;

#[async_trait]
impl Actor for Fanout {
    fn name(&self) -> &str {
        &self.name
    }

    async fn connect(&self, parallelism: usize, peer: Arc<dyn Actor>) -> Result<()> {
        self.out.connect(parallelism, peer);
        Ok(())
    }

    async fn receive(&self, msg: Message) -> Result<()> {
        self.out.dispatch(msg).await
    }

    async fn start(&self) -> Result<()> {
        self.lifecycle.start(&self.name)?;
        tracing::info!(actor = %self.name, peers = self.out.len(), "fanout started");
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.lifecycle.stop(&self.name)?;
        self.out.close();
        tracing::info!(actor = %self.name, "fanout stopped");
        Ok(())
    }
}

impl std::fmt::Debug for Fanout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fanout").field("name", &self.name).finish()
    }
}

#[cfg(test)]
#[path = "fanout_test.rs"]
mod fanout_test;
