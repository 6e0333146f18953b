//! TCP head - delivers payloads over a long-lived TCP connection
//!
//! Write failures invalidate the connection and ask the sink for a
//! reconnect; the sink's backoff policy decides when the next `connect`
//! lands here.

use std::io::{self, ErrorKind};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;

use super::{SinkHead, WriteError};

/// Default connection establishment timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default per-payload write timeout
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Head writing raw payloads to a TCP peer
pub struct TcpHead {
    target: String,
    connect_timeout: Duration,
    write_timeout: Duration,

    /// TCP connection (protected by mutex for reconnection)
    conn: Mutex<Option<TcpStream>>,
}

impl TcpHead {
    /// Create a head targeting `host:port`
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            connect_timeout: CONNECT_TIMEOUT,
            write_timeout: WRITE_TIMEOUT,
            conn: Mutex::new(None),
        }
    }

    /// Override the connection timeout
    #[must_use]
    pub fn with_connect_timeout(mut self, value: Duration) -> Self {
        self.connect_timeout = value;
        self
    }

    /// Override the write timeout
    #[must_use]
    pub fn with_write_timeout(mut self, value: Duration) -> Self {
        self.write_timeout = value;
        self
    }
}

#[async_trait]
impl SinkHead for TcpHead {
    async fn connect(&self) -> io::Result<()> {
        let mut conn = self.conn.lock().await;
        conn.take();

        let stream = match timeout(self.connect_timeout, TcpStream::connect(&self.target)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                return Err(io::Error::new(
                    ErrorKind::TimedOut,
                    format!("connection to {} timed out", self.target),
                ));
            }
        };

        // Lower latency for small payloads; non-fatal if it fails.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(target = %self.target, error = %e, "failed to set TCP_NODELAY");
        }

        tracing::debug!(target = %self.target, "tcp head connected");
        *conn = Some(stream);
        Ok(())
    }

    async fn write(&self, payload: &[u8]) -> Result<usize, WriteError> {
        let mut conn = self.conn.lock().await;
        let stream = conn.as_mut().ok_or_else(WriteError::not_connected)?;

        let result = timeout(self.write_timeout, async {
            stream.write_all(payload).await?;
            stream.flush().await?;
            Ok::<(), io::Error>(())
        })
        .await;

        match result {
            Ok(Ok(())) => Ok(payload.len()),
            Ok(Err(e)) => {
                conn.take();
                Err(WriteError::reconnect(e))
            }
            Err(_) => {
                conn.take();
                Err(WriteError::reconnect(io::Error::new(
                    ErrorKind::TimedOut,
                    "write timed out",
                )))
            }
        }
    }

    async fn start(&self) -> io::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> io::Result<()> {
        self.conn.lock().await.take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    use super::*;

    #[tokio::test]
    async fn test_write_without_connection_requests_reconnect() {
        let head = TcpHead::new("127.0.0.1:1");
        let err = head.write(b"x").await.unwrap_err();
        assert!(err.reconnect);
    }

    #[tokio::test]
    async fn test_connect_failure_surfaces_io_error() {
        // Nothing listens on port 1.
        let head = TcpHead::new("127.0.0.1:1").with_connect_timeout(Duration::from_secs(2));
        assert!(head.connect().await.is_err());
    }

    #[tokio::test]
    async fn test_delivers_payload() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 7];
            stream.read_exact(&mut buf).await.unwrap();
            buf
        });

        let head = TcpHead::new(addr.to_string());
        head.connect().await.unwrap();
        assert_eq!(head.write(b"payload").await.unwrap(), 7);
        head.stop().await.unwrap();

        assert_eq!(server.await.unwrap(), b"payload");
    }
}
