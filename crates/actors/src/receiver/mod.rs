//! Receivers - network entry points of a pipeline
//!
//! Receivers turn external traffic into [`Message`]s and fan them into
//! their connected peers. Both receivers take a `bind_addr` param and run
//! their accept/read loops on background tasks until stopped.
//!
//! [`Message`]: flowd_core::Message

mod tcp;
mod udp;

pub use tcp::TcpReceiver;
pub use udp::UdpReceiver;
