//! Sink - terminal delivery with resilient reconnection
//!
//! A sink owns one [`SinkHead`] (the actual transport) and a pool of write
//! workers draining its inbound queue. Delivery outcomes are communicated
//! through message completion only: `Done` on a successful write, `Failed`
//! otherwise.
//!
//! # Reconnection
//!
//! Connectivity is managed by a dedicated coordinator task, independent of
//! write traffic. A worker whose write poisoned the connection issues a
//! reconnect request and blocks until exactly that request resolves -
//! either the head reconnected or the retry budget ran out. Requests
//! arriving while an attempt is in flight collapse into it, so N
//! concurrent write failures cause one reconnection, not N.
//!
//! Backoff starts at `min_backoff`, doubles per failed attempt and is
//! capped at `max_backoff`. With `max_retries = 0` the coordinator retries
//! forever; otherwise exhausting the budget is fatal: waiting workers are
//! released with an error and the failure is reported to the pipeline
//! supervisor through the context.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use crossfire::{MAsyncRx, MAsyncTx};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use flowd_core::{
    Actor, Constructor, Context, CoreError, Lifecycle, Message, Params, Result, Status,
};

use crate::heads::{build_head, SinkHead};
use crate::outbound::{complete_quietly, edge_queue_size};

/// Default lower backoff bound
const MIN_BACKOFF: Duration = Duration::from_millis(50);

/// Default upper backoff bound
const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// Capacity of the reconnect request channel
const RECONNECT_QUEUE_SIZE: usize = 64;

/// Sink backoff/retry configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkCfg {
    /// Initial reconnect delay
    pub min_backoff: Duration,

    /// Upper bound for the doubled delay
    pub max_backoff: Duration,

    /// Consecutive failed attempts before giving up; 0 retries forever
    pub max_retries: usize,
}

impl Default for SinkCfg {
    fn default() -> Self {
        Self {
            min_backoff: MIN_BACKOFF,
            max_backoff: MAX_BACKOFF,
            max_retries: 0,
        }
    }
}

impl SinkCfg {
    /// Read `max_retries`, `min_backoff` and `max_backoff` (milliseconds)
    /// from the actor params, defaulting what is absent
    pub fn from_params(actor: &str, params: &Params) -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(n) = int_param(actor, params, "max_retries")? {
            cfg.max_retries = n as usize;
        }
        if let Some(ms) = int_param(actor, params, "min_backoff")? {
            cfg.min_backoff = Duration::from_millis(ms as u64);
        }
        if let Some(ms) = int_param(actor, params, "max_backoff")? {
            cfg.max_backoff = Duration::from_millis(ms as u64);
        }
        Ok(cfg)
    }
}

/// Fetch an optional non-negative integer parameter
fn int_param(actor: &str, params: &Params, param: &str) -> Result<Option<i64>> {
    match params.get(param) {
        None => Ok(None),
        Some(value) => match value.as_int() {
            Some(n) if n >= 0 => Ok(Some(n)),
            Some(n) => Err(CoreError::InvalidParam {
                actor: actor.to_owned(),
                param: param.to_owned(),
                reason: format!("must be non-negative, got {n}"),
            }),
            None => Err(CoreError::InvalidParam {
                actor: actor.to_owned(),
                param: param.to_owned(),
                reason: format!("expected integer, got {}", value.type_name()),
            }),
        },
    }
}

/// One in-flight reconnect request; the coordinator resolves the oneshot
struct ReconnectRequest {
    done: oneshot::Sender<Result<()>>,
}

/// Terminal delivery actor
pub struct Sink {
    name: String,
    ctx: Arc<Context>,
    cfg: SinkCfg,
    head: Arc<dyn SinkHead>,

    /// Send side of the write queue; dropped on stop to release workers
    queue_tx: Mutex<Option<MAsyncTx<Message>>>,

    /// Shared receive side, cloned per write worker at start
    queue_rx: MAsyncRx<Message>,

    /// Reconnect request channel ends; rx is handed to the coordinator
    reconnect_tx: Mutex<Option<mpsc::Sender<ReconnectRequest>>>,
    reconnect_rx: Mutex<Option<mpsc::Receiver<ReconnectRequest>>>,

    /// Interrupts a backoff sleep on stop
    shutdown: CancellationToken,

    lifecycle: Lifecycle,
}

impl Sink {
    /// Registry constructor for `core.sink`; the head comes from the
    /// `sink_type` param
    pub fn build(name: &str, ctx: Arc<Context>, params: &Params) -> Result<Arc<dyn Actor>> {
        let head = build_head(name, params)?;
        Ok(Self::with_head(name, ctx, params, head)?)
    }

    /// Create a sink around an explicit head
    pub fn with_head(
        name: &str,
        ctx: Arc<Context>,
        params: &Params,
        head: Arc<dyn SinkHead>,
    ) -> Result<Arc<Self>> {
        let cfg = SinkCfg::from_params(name, params)?;
        let (queue_tx, queue_rx) = crossfire::mpmc::bounded_async(edge_queue_size(&ctx, params));
        let (reconnect_tx, reconnect_rx) = mpsc::channel(RECONNECT_QUEUE_SIZE);

        Ok(Arc::new(Self {
            name: name.to_owned(),
            ctx,
            cfg,
            head,
            queue_tx: Mutex::new(Some(queue_tx)),
            queue_rx,
            reconnect_tx: Mutex::new(Some(reconnect_tx)),
            reconnect_rx: Mutex::new(Some(reconnect_rx)),
            shutdown: CancellationToken::new(),
            lifecycle: Lifecycle::new(),
        }))
    }

    /// The sink's backoff/retry configuration
    pub fn cfg(&self) -> &SinkCfg {
        &self.cfg
    }

    fn closed(&self) -> CoreError {
        CoreError::QueueClosed {
            actor: self.name.clone(),
        }
    }

    /// Tear down the channels after a failed start, releasing the
    /// already-spawned workers and coordinator
    fn abort_start(&self) {
        self.queue_tx.lock().take();
        self.reconnect_tx.lock().take();
        self.shutdown.cancel();
    }
}

// Matches the registry constructor shape.
const _: Constructor = Sink::build;

#[async_trait]
impl Actor for Sink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn connect(&self, _parallelism: usize, _peer: Arc<dyn Actor>) -> Result<()> {
        // Sinks are pipeline leaves.
        Err(CoreError::NotConnectable {
            actor: self.name.clone(),
        })
    }

    async fn receive(&self, msg: Message) -> Result<()> {
        let tx = self
            .queue_tx
            .lock()
            .as_ref()
            .cloned()
            .ok_or_else(|| self.closed())?;
        tx.send(msg).await.map_err(|_| self.closed())
    }

    async fn start(&self) -> Result<()> {
        self.lifecycle.start(&self.name)?;

        let workers = self.ctx.maxprocs()?;
        let reconnect_rx = self
            .reconnect_rx
            .lock()
            .take()
            .ok_or_else(|| self.closed())?;
        let reconnect_tx = self
            .reconnect_tx
            .lock()
            .as_ref()
            .cloned()
            .ok_or_else(|| self.closed())?;

        tokio::spawn(run_coordinator(
            self.name.clone(),
            Arc::clone(&self.ctx),
            self.cfg.clone(),
            Arc::clone(&self.head),
            self.shutdown.clone(),
            reconnect_rx,
        ));

        for _ in 0..workers.max(1) {
            tokio::spawn(run_worker(
                self.name.clone(),
                self.queue_rx.clone(),
                Arc::clone(&self.head),
                reconnect_tx.clone(),
            ));
        }

        if let Err(e) = self.head.start().await {
            self.abort_start();
            return Err(e.into());
        }

        // Establish the initial connection; exhausting the retry budget
        // here fails the start instead of leaving a dead sink behind.
        if let Err(e) = request_reconnect(&self.name, &reconnect_tx).await {
            self.abort_start();
            return Err(e);
        }

        tracing::info!(sink = %self.name, workers, "sink started");
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.lifecycle.stop(&self.name)?;

        self.head.stop().await?;
        // Closure order matters: write queue first so workers drain out,
        // then the reconnect channel, then the backoff interrupt.
        self.queue_tx.lock().take();
        self.reconnect_tx.lock().take();
        self.shutdown.cancel();

        tracing::info!(sink = %self.name, "sink stopped");
        Ok(())
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink")
            .field("name", &self.name)
            .field("cfg", &self.cfg)
            .finish()
    }
}

/// Issue a reconnect request and wait for that request to resolve
async fn request_reconnect(actor: &str, tx: &mpsc::Sender<ReconnectRequest>) -> Result<()> {
    let (done_tx, done_rx) = oneshot::channel();
    tx.send(ReconnectRequest { done: done_tx })
        .await
        .map_err(|_| CoreError::QueueClosed {
            actor: actor.to_owned(),
        })?;
    match done_rx.await {
        Ok(result) => result,
        // Coordinator dropped the request mid-shutdown.
        Err(_) => Err(CoreError::QueueClosed {
            actor: actor.to_owned(),
        }),
    }
}

/// Write worker: drain the queue, resolve each message's completion
async fn run_worker(
    name: String,
    rx: MAsyncRx<Message>,
    head: Arc<dyn SinkHead>,
    reconnect_tx: mpsc::Sender<ReconnectRequest>,
) {
    while let Ok(msg) = rx.recv().await {
        match head.write(&msg.body()).await {
            Ok(_) => complete_quietly(&name, &msg, Status::Done),
            Err(e) => {
                tracing::error!(sink = %name, error = %e, "failed to send message");
                complete_quietly(&name, &msg, Status::Failed);
                if e.reconnect && request_reconnect(&name, &reconnect_tx).await.is_err() {
                    // Coordinator is gone: the sink is stopping or gave up.
                    break;
                }
            }
        }
    }
    tracing::debug!(sink = %name, "write worker exiting");
}

/// Outcome of one backoff-driven connection attempt series
enum ConnectOutcome {
    Connected,
    Cancelled,
    Exhausted(usize),
}

/// Reconnect coordinator: serializes connection attempts for the head
async fn run_coordinator(
    name: String,
    ctx: Arc<Context>,
    cfg: SinkCfg,
    head: Arc<dyn SinkHead>,
    shutdown: CancellationToken,
    mut rx: mpsc::Receiver<ReconnectRequest>,
) {
    loop {
        let first = tokio::select! {
            _ = shutdown.cancelled() => break,
            req = rx.recv() => match req {
                Some(req) => req,
                None => break,
            },
        };

        // Concurrent failures collapse into a single attempt series.
        let mut waiters = vec![first.done];
        while let Ok(extra) = rx.try_recv() {
            waiters.push(extra.done);
        }

        match connect_with_backoff(&name, &cfg, &head, &shutdown).await {
            ConnectOutcome::Connected => {
                for done in waiters {
                    let _ = done.send(Ok(()));
                }
            }
            ConnectOutcome::Cancelled => break,
            ConnectOutcome::Exhausted(retries) => {
                for done in waiters {
                    let _ = done.send(Err(CoreError::ReconnectExhausted {
                        actor: name.clone(),
                        retries,
                    }));
                }
                ctx.report_fatal(
                    &name,
                    CoreError::ReconnectExhausted {
                        actor: name.clone(),
                        retries,
                    },
                );
                break;
            }
        }
    }
    tracing::debug!(sink = %name, "reconnect coordinator exiting");
}

/// Drive `head.connect` with exponential backoff until success, shutdown
/// or an exhausted retry budget
async fn connect_with_backoff(
    name: &str,
    cfg: &SinkCfg,
    head: &Arc<dyn SinkHead>,
    shutdown: &CancellationToken,
) -> ConnectOutcome {
    let mut backoff = cfg.min_backoff;
    let mut retried = 0usize;
    loop {
        match head.connect().await {
            Ok(()) => {
                if retried > 0 {
                    tracing::info!(sink = %name, retries = retried, "head reconnected");
                }
                return ConnectOutcome::Connected;
            }
            Err(e) => {
                tracing::error!(sink = %name, error = %e, "head failed to connect");
                if cfg.max_retries > 0 && retried >= cfg.max_retries {
                    return ConnectOutcome::Exhausted(retried);
                }
                tracing::trace!(
                    sink = %name,
                    backoff_ms = backoff.as_millis() as u64,
                    "will retry connecting"
                );
                tokio::select! {
                    _ = shutdown.cancelled() => return ConnectOutcome::Cancelled,
                    _ = sleep(backoff) => {}
                }
                if backoff < cfg.max_backoff {
                    backoff = (backoff * 2).min(cfg.max_backoff);
                }
                retried += 1;
            }
        }
    }
}

#[cfg(test)]
#[path = "sink_test.rs"]
mod sink_test;
