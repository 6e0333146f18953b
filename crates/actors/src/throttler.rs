//! Throttler - rate-limit the flow between two pipeline stages
//!
//! A token bucket refilled at `rps` tokens per second with a burst
//! capacity of one second's worth. Messages arriving with the bucket
//! empty are completed as `Throttled` and dropped; everything else passes
//! through untouched.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use parking_lot::Mutex;

use flowd_core::{Actor, Constructor, Context, CoreError, Lifecycle, Message, Params, Result, Status};

use crate::outbound::{complete_quietly, edge_queue_size, Outbound};

struct Bucket {
    tokens: f64,
    last: Instant,
}

pub struct Throttler {
    name: String,
    rps: f64,
    bucket: Mutex<Bucket>,
    out: Outbound,
    lifecycle: Lifecycle,
}

impl Throttler {
    /// Registry constructor for `core.throttler`; requires a positive
    /// integer `rps` param
    pub fn build(name: &str, ctx: Arc<Context>, params: &Params) -> Result<Arc<dyn Actor>> {
        let rps = params.get("rps").ok_or_else(|| CoreError::MissingParam {
            actor: name.to_owned(),
            param: "rps".to_owned(),
        })?;
        let rps = match rps.as_int() {
            Some(n) if n > 0 => n as f64,
            Some(n) => {
                return Err(CoreError::InvalidParam {
                    actor: name.to_owned(),
                    param: "rps".to_owned(),
                    reason: format!("must be positive, got {n}"),
                })
            }
            None => {
                return Err(CoreError::InvalidParam {
                    actor: name.to_owned(),
                    param: "rps".to_owned(),
                    reason: format!("expected integer, got {}", rps.type_name()),
                })
            }
        };

        Ok(Arc::new(Self {
            name: name.to_owned(),
            rps,
            bucket: Mutex::new(Bucket {
                tokens: rps,
                last: Instant::now(),
            }),
            out: Outbound::new(name, edge_queue_size(&ctx, params)),
            lifecycle: Lifecycle::new(),
        }))
    }

    /// Take one token if the bucket holds one
    fn admit(&self) -> bool {
        let mut bucket = self.bucket.lock();
        let now = Instant::now();
        let refilled = bucket.tokens + now.duration_since(bucket.last).as_secs_f64() * self.rps;
        bucket.tokens = refilled.min(self.rps);
        bucket.last = now;
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

// Matches the registry constructor shape.
const _: Constructor = Throttler::build;

#[async_trait]
impl Actor for Throttler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn connect(&self, parallelism: usize, peer: Arc<dyn Actor>) -> Result<()> {
        self.out.connect(parallelism, peer);
        Ok(())
    }

    async fn receive(&self, msg: Message) -> Result<()> {
        if !self.admit() {
            tracing::trace!(actor = %self.name, "over quota, dropping message");
            complete_quietly(&self.name, &msg, Status::Throttled);
            return Ok(());
        }
        self.out.dispatch(msg).await
    }

    async fn start(&self) -> Result<()> {
        self.lifecycle.start(&self.name)?;
        tracing::info!(actor = %self.name, rps = self.rps, "throttler started");
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.lifecycle.stop(&self.name)?;
        self.out.close();
        tracing::info!(actor = %self.name, "throttler stopped");
        Ok(())
    }
}

impl std::fmt::Debug for Throttler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttler")
            .field("name", &self.name)
            .field("rps", &self.rps)
            .finish()
    }
}

#[cfg(test)]
#[path = "throttler_test.rs"]
mod throttler_test;
