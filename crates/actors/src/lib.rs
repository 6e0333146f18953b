//! Built-in pipeline actors
//!
//! The stock building blocks a pipeline is assembled from: network
//! receivers at the edges, a metadata router and a fanout in the middle,
//! a throttler for flow control and sinks at the leaves.
//!
//! Every actor here follows the same shape: a registry-compatible
//! `build` constructor taking the actor name, the shared [`Context`] and
//! its config params, plus the [`Actor`] contract for wiring, traffic
//! and lifecycle.
//!
//! [`Actor`]: flowd_core::Actor
//! [`Context`]: flowd_core::Context

mod fanout;
pub mod heads;
mod outbound;
pub mod receiver;
mod router;
mod sink;
mod throttler;

#[cfg(test)]
pub(crate) mod testutil;

pub use fanout::Fanout;
pub use heads::{build_head, DumperHead, NullHead, SinkHead, TcpHead, UdpHead, WriteError};
pub use outbound::Outbound;
pub use receiver::{TcpReceiver, UdpReceiver};
pub use router::{Router, META_SENDTO};
pub use sink::{Sink, SinkCfg};
pub use throttler::Throttler;
