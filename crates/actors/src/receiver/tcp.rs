//! TCP receiver
//!
//! Accepts stream connections and splits each one into newline-delimited
//! segments; every segment becomes one message dispatched downstream.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

use flowd_core::{Actor, Constructor, Context, Lifecycle, Message, Params, Result};

use crate::heads::required_str;
use crate::outbound::{edge_queue_size, Outbound};

pub struct TcpReceiver {
    name: String,
    bind_addr: String,
    out: Arc<Outbound>,
    /// Filled in on start; useful when binding to port 0
    local_addr: Mutex<Option<SocketAddr>>,
    shutdown: CancellationToken,
    lifecycle: Lifecycle,
}

impl TcpReceiver {
    /// Registry constructor for `core.receiver.tcp`; requires `bind_addr`
    pub fn build(name: &str, ctx: Arc<Context>, params: &Params) -> Result<Arc<dyn Actor>> {
        Ok(Self::new(name, ctx, params)?)
    }

    /// Create the receiver without erasing its concrete type
    pub fn new(name: &str, ctx: Arc<Context>, params: &Params) -> Result<Arc<Self>> {
        let bind_addr = required_str(name, params, "bind_addr")?;
        Ok(Arc::new(Self {
            name: name.to_owned(),
            bind_addr,
            out: Arc::new(Outbound::new(name, edge_queue_size(&ctx, params))),
            local_addr: Mutex::new(None),
            shutdown: CancellationToken::new(),
            lifecycle: Lifecycle::new(),
        }))
    }

    /// The address the listener actually bound to
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock()
    }
}

// Matches the registry constructor shape.
const _: Constructor = TcpReceiver::build;

/// Read one connection to exhaustion, one message per line
async fn serve_conn(name: String, stream: TcpStream, out: Arc<Outbound>, token: CancellationToken) {
    let mut lines = BufReader::new(stream).split(b'\n');
    loop {
        let segment = tokio::select! {
            _ = token.cancelled() => break,
            segment = lines.next_segment() => segment,
        };
        match segment {
            Ok(Some(line)) => {
                if line.is_empty() {
                    continue;
                }
                if let Err(e) = out.dispatch(Message::new(&line)).await {
                    tracing::error!(receiver = %name, error = %e, "failed to dispatch message");
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(receiver = %name, error = %e, "connection read failed");
                break;
            }
        }
    }
}

async fn accept_loop(
    name: String,
    listener: TcpListener,
    out: Arc<Outbound>,
    token: CancellationToken,
) {
    loop {
        let accepted = tokio::select! {
            _ = token.cancelled() => break,
            accepted = listener.accept() => accepted,
        };
        match accepted {
            Ok((stream, peer)) => {
                tracing::debug!(receiver = %name, peer = %peer, "accepted connection");
                tokio::spawn(serve_conn(
                    name.clone(),
                    stream,
                    Arc::clone(&out),
                    token.clone(),
                ));
            }
            Err(e) => {
                tracing::error!(receiver = %name, error = %e, "accept failed");
                break;
            }
        }
    }
    tracing::debug!(receiver = %name, "accept loop exiting");
}

#[async_trait]
impl Actor for TcpReceiver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn connect(&self, parallelism: usize, peer: Arc<dyn Actor>) -> Result<()> {
        self.out.connect(parallelism, peer);
        Ok(())
    }

    async fn receive(&self, msg: Message) -> Result<()> {
        // Internally injected traffic flows through like network traffic.
        self.out.dispatch(msg).await
    }

    async fn start(&self) -> Result<()> {
        self.lifecycle.start(&self.name)?;
        let listener = TcpListener::bind(&self.bind_addr).await?;
        let local = listener.local_addr()?;
        *self.local_addr.lock() = Some(local);
        tokio::spawn(accept_loop(
            self.name.clone(),
            listener,
            Arc::clone(&self.out),
            self.shutdown.clone(),
        ));
        tracing::info!(receiver = %self.name, addr = %local, "tcp receiver listening");
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.lifecycle.stop(&self.name)?;
        self.shutdown.cancel();
        self.out.close();
        tracing::info!(receiver = %self.name, "tcp receiver stopped");
        Ok(())
    }
}

impl std::fmt::Debug for TcpReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpReceiver")
            .field("name", &self.name)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

#[cfg(test)]
#[path = "tcp_test.rs"]
mod tcp_test;
