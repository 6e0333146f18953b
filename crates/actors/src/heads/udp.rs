//! UDP head - delivers payloads as connected datagrams
//!
//! A datagram either leaves the socket or it does not; there is no
//! connection to poison. Send failures still ask for a reconnect so a
//! re-resolve of the target picks up address changes.

use std::io;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::sync::Mutex;

use super::{SinkHead, WriteError};

/// Head sending each payload as one datagram
pub struct UdpHead {
    target: String,
    socket: Mutex<Option<UdpSocket>>,
}

impl UdpHead {
    /// Create a head targeting `host:port`
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            socket: Mutex::new(None),
        }
    }
}

#[async_trait]
impl SinkHead for UdpHead {
    async fn connect(&self) -> io::Result<()> {
        let mut socket = self.socket.lock().await;
        socket.take();

        let bound = UdpSocket::bind("0.0.0.0:0").await?;
        bound.connect(&self.target).await?;

        tracing::debug!(target = %self.target, "udp head connected");
        *socket = Some(bound);
        Ok(())
    }

    async fn write(&self, payload: &[u8]) -> Result<usize, WriteError> {
        let mut socket = self.socket.lock().await;
        let bound = socket.as_mut().ok_or_else(WriteError::not_connected)?;

        match bound.send(payload).await {
            Ok(n) => Ok(n),
            Err(e) => {
                socket.take();
                Err(WriteError::reconnect(e))
            }
        }
    }

    async fn start(&self) -> io::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> io::Result<()> {
        self.socket.lock().await.take();
        Ok(())
    }
}
