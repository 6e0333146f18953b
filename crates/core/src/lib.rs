//! flowd - Core types
//!
//! The message, the actor contract and the pipeline context: everything an
//! actor implementation needs, and nothing about how actors are wired
//! together (that lives in `flowd-pipeline`).
//!
//! # Key pieces
//!
//! - [`Message`]: immutable-payload, mutable-metadata unit of work with a
//!   one-shot completion state machine observable by any number of waiters.
//! - [`Actor`]: the capability contract every pipeline node implements
//!   (naming, connecting to peers, receiving, start/stop lifecycle).
//! - [`Value`] / [`Params`]: the tagged value type shared by construction
//!   parameters and message metadata.
//! - [`Context`]: typed config lookup plus fatal-failure reporting.
//!
//! # Example
//!
//! ```
//! use flowd_core::{Message, Status};
//!
//! let msg = Message::new(b"payload");
//! msg.set_meta("sendto", "out");
//!
//! msg.complete(Status::Done).unwrap();
//! assert_eq!(msg.status(), Status::Done);
//! assert!(msg.complete(Status::Failed).is_err());
//! ```

mod actor;
mod context;
mod error;
mod message;
mod value;

pub use actor::{Actor, Constructor, Lifecycle};
pub use context::{ConfigGet, Context, FatalFailure, SYSTEM_MAXPROCS};
pub use error::{CoreError, Result};
pub use message::{Message, Status};
pub use value::{Params, Value};
