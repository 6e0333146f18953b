//! Sink heads - the external delivery capability a sink wraps
//!
//! A head is the actual transport (TCP, UDP, file, null). The sink owns
//! exactly one head and drives it through this contract; reconnection
//! policy lives in the sink, the head only reports whether a failed write
//! warrants one.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use flowd_core::{CoreError, Params, Result};

mod dumper;
mod null;
mod tcp;
mod udp;

pub use dumper::DumperHead;
pub use null::NullHead;
pub use tcp::TcpHead;
pub use udp::UdpHead;

/// A failed delivery attempt
#[derive(Debug, Error)]
#[error("{source}")]
pub struct WriteError {
    /// The underlying IO failure
    #[source]
    pub source: io::Error,

    /// Whether the sink should re-establish the connection before the
    /// next attempt
    pub reconnect: bool,
}

impl WriteError {
    /// A write failure that poisoned the connection
    pub fn reconnect(source: io::Error) -> Self {
        Self {
            source,
            reconnect: true,
        }
    }

    /// A write failure the current connection can survive
    pub fn transient(source: io::Error) -> Self {
        Self {
            source,
            reconnect: false,
        }
    }

    /// The standing "no connection established" failure
    pub fn not_connected() -> Self {
        Self::reconnect(io::Error::new(
            io::ErrorKind::NotConnected,
            "no connection to target",
        ))
    }
}

/// External delivery capability
#[async_trait]
pub trait SinkHead: Send + Sync {
    /// Establish (or re-establish) the transport connection
    async fn connect(&self) -> io::Result<()>;

    /// Deliver one payload; returns the number of bytes written
    async fn write(&self, payload: &[u8]) -> std::result::Result<usize, WriteError>;

    /// One-time head startup
    async fn start(&self) -> io::Result<()>;

    /// Final head shutdown
    async fn stop(&self) -> io::Result<()>;
}

impl std::fmt::Debug for dyn SinkHead {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SinkHead")
    }
}

/// Build the head selected by the `sink_type` parameter
///
/// Recognised types: `null`, `dumper` (requires `out_path`), `tcp` and
/// `udp` (both require `target_addr`).
pub fn build_head(actor: &str, params: &Params) -> Result<Arc<dyn SinkHead>> {
    let sink_type = params
        .get("sink_type")
        .ok_or_else(|| CoreError::MissingParam {
            actor: actor.to_owned(),
            param: "sink_type".to_owned(),
        })?;
    let sink_type = sink_type.as_str().ok_or_else(|| CoreError::InvalidParam {
        actor: actor.to_owned(),
        param: "sink_type".to_owned(),
        reason: format!("expected string, got {}", sink_type.type_name()),
    })?;

    match sink_type {
        "null" => Ok(Arc::new(NullHead::new())),
        "dumper" => Ok(Arc::new(DumperHead::new(required_str(
            actor, params, "out_path",
        )?))),
        "tcp" => Ok(Arc::new(TcpHead::new(required_str(
            actor,
            params,
            "target_addr",
        )?))),
        "udp" => Ok(Arc::new(UdpHead::new(required_str(
            actor,
            params,
            "target_addr",
        )?))),
        other => Err(CoreError::InvalidParam {
            actor: actor.to_owned(),
            param: "sink_type".to_owned(),
            reason: format!("unknown sink type {other:?}"),
        }),
    }
}

/// Fetch a required string parameter
pub(crate) fn required_str(actor: &str, params: &Params, param: &str) -> Result<String> {
    let value = params.get(param).ok_or_else(|| CoreError::MissingParam {
        actor: actor.to_owned(),
        param: param.to_owned(),
    })?;
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| CoreError::InvalidParam {
            actor: actor.to_owned(),
            param: param.to_owned(),
            reason: format!("expected string, got {}", value.type_name()),
        })
}
