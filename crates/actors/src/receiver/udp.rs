//! UDP receiver
//!
//! One datagram, one message. Payloads beyond the read buffer are
//! truncated by the kernel, so the buffer is sized generously.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

use flowd_core::{Actor, Constructor, Context, Lifecycle, Message, Params, Result};

use crate::heads::required_str;
use crate::outbound::{edge_queue_size, Outbound};

/// Largest datagram accepted in one read
const READ_BUF_SIZE: usize = 64 * 1024;

pub struct UdpReceiver {
    name: String,
    bind_addr: String,
    out: Arc<Outbound>,
    local_addr: Mutex<Option<SocketAddr>>,
    shutdown: CancellationToken,
    lifecycle: Lifecycle,
}

impl UdpReceiver {
    /// Registry constructor for `core.receiver.udp`; requires `bind_addr`
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

    /// The address the socket actually bound to
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock()
    }
}

// Matches the registry constructor shape.
const _: Constructor = UdpReceiver::build;

async fn read_loop(name: String, socket: UdpSocket, out: Arc<Outbound>, token: CancellationToken) {
    let mut buf = vec![0u8; READ_BUF_SIZE];
    loop {
        let received = tokio::select! {
            _ = token.cancelled() => break,
            received = socket.recv_from(&mut buf) => received,
        };
        match received {
            Ok((len, _peer)) => {
                if len == 0 {
                    continue;
                }
                if let Err(e) = out.dispatch(Message::new(&buf[..len])).await {
                    tracing::error!(receiver = %name, error = %e, "failed to dispatch message");
                }
            }
            Err(e) => {
                tracing::error!(receiver = %name, error = %e, "datagram read failed");
                break;
            }
        }
    }
    tracing::debug!(receiver = %name, "read loop exiting");
}

#[async_trait]
impl Actor for UdpReceiver {
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
        let socket = UdpSocket::bind(&self.bind_addr).await?;
        let local = socket.local_addr()?;
        *self.local_addr.lock() = Some(local);
        tokio::spawn(read_loop(
            self.name.clone(),
            socket,
            Arc::clone(&self.out),
            self.shutdown.clone(),
        ));
        tracing::info!(receiver = %self.name, addr = %local, "udp receiver listening");
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.lifecycle.stop(&self.name)?;
        self.shutdown.cancel();
        self.out.close();
        tracing::info!(receiver = %self.name, "udp receiver stopped");
        Ok(())
    }
}

impl std::fmt::Debug for UdpReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpReceiver")
            .field("name", &self.name)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

#[cfg(test)]
#[path = "udp_test.rs"]
mod udp_test;
