//! Message - the unit of work flowing through the pipeline
//!
//! A message carries an immutable-once-set byte body, free-form metadata
//! (routing key, trace id, ...) and a one-shot completion state machine.
//! The receiver that created a message can wait for its terminal status;
//! whichever actor finishes the message calls [`Message::complete`] exactly
//! once.
//!
//! # Design
//!
//! - `Message` is a cheap `Arc` handle; actors clone it freely while the
//!   payload stays shared.
//! - Body, metadata and status live behind a single `parking_lot::Mutex`,
//!   held only for the duration of the field access - never across an
//!   await point.
//! - Completion is observable both from async tasks ([`Message::completed`])
//!   and from plain threads ([`Message::wait`]); all waiters see the same
//!   terminal status, including waiters that subscribe after completion.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::{Condvar, Mutex};
use tokio::sync::watch;

use crate::error::{CoreError, Result};
use crate::value::Value;

/// Terminal (and initial) status of a message
///
/// A message starts as `New` and transitions exactly once to any other
/// status. The terminal status is the only result channel between the
/// actor that finished the message and the original sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Not yet completed
    New,
    /// Left the pipeline successfully
    Done,
    /// Some pipeline branches delivered the message, some failed
    PartialSend,
    /// Recognised as invalid by a component; can not proceed
    Invalid,
    /// Submission failed
    Failed,
    /// A component triggered a timeout watermark
    TimedOut,
    /// No destination exists under the requested routing key
    Unroutable,
    /// Dropped due to quota exhaustion
    Throttled,
}

impl Status {
    /// Whether this status is terminal (anything but `New`)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::New)
    }

    /// Status name for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Done => "done",
            Self::PartialSend => "partial_send",
            Self::Invalid => "invalid",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
            Self::Unroutable => "unroutable",
            Self::Throttled => "throttled",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable message state, guarded by one lock
struct State {
    body: Bytes,
    meta: HashMap<String, Value>,
    status: Status,
}

struct Inner {
    state: Mutex<State>,
    /// Releases blocking waiters; paired with `state`
    cond: Condvar,
    /// Releases async waiters; the payload mirrors the committed status
    done_tx: watch::Sender<Status>,
}

/// A pipeline message: shared handle over body, metadata and completion
#[derive(Clone)]
pub struct Message {
    inner: Arc<Inner>,
}

impl Message {
    /// Create a new message, defensively copying the body
    pub fn new(body: &[u8]) -> Self {
        Self::from_parts(Bytes::copy_from_slice(body), HashMap::new())
    }

    fn from_parts(body: Bytes, meta: HashMap<String, Value>) -> Self {
        let (done_tx, _) = watch::channel(Status::New);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    body,
                    meta,
                    status: Status::New,
                }),
                cond: Condvar::new(),
                done_tx,
            }),
        }
    }

    /// Current message body
    #[inline]
    pub fn body(&self) -> Bytes {
        self.inner.state.lock().body.clone()
    }

    /// Replace the message body
    pub fn set_body(&self, body: impl Into<Bytes>) {
        self.inner.state.lock().body = body.into();
    }

    /// Look up a metadata value
    pub fn meta(&self, key: &str) -> Option<Value> {
        self.inner.state.lock().meta.get(key).cloned()
    }

    /// Set a metadata value
    pub fn set_meta(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.inner.state.lock().meta.insert(key.into(), value.into());
    }

    /// All metadata keys currently set
    pub fn meta_keys(&self) -> Vec<String> {
        self.inner.state.lock().meta.keys().cloned().collect()
    }

    /// Current status (`New` until completed)
    #[inline]
    pub fn status(&self) -> Status {
        self.inner.state.lock().status
    }

    /// Complete the message with a terminal status
    ///
    /// Transitions `New -> status` exactly once and releases all current
    /// and future waiters. A repeated call returns
    /// [`CoreError::AlreadyCompleted`] and leaves the committed status
    /// untouched.
    pub fn complete(&self, status: Status) -> Result<()> {
        {
            let mut state = self.inner.state.lock();
            if state.status != Status::New {
                return Err(CoreError::AlreadyCompleted);
            }
            state.status = status;
            self.inner.cond.notify_all();
        }
        // Watch subscribers observe the committed status without the lock.
        let _ = self.inner.done_tx.send(status);
        Ok(())
    }

    /// Await completion from an async task
    ///
    /// Returns immediately if the message is already completed. Any number
    /// of concurrent waiters observe the identical terminal status.
    pub async fn completed(&self) -> Status {
        let mut rx = self.inner.done_tx.subscribe();
        loop {
            let status = *rx.borrow_and_update();
            if status.is_terminal() {
                return status;
            }
            if rx.changed().await.is_err() {
                // Sender lives as long as this handle; unreachable in practice.
                return *rx.borrow();
            }
        }
    }

    /// Block the calling thread until completion
    ///
    /// The blocking twin of [`Message::completed`], for waiters outside the
    /// async runtime. Do not call from an async task.
    pub fn wait(&self) -> Status {
        let mut state = self.inner.state.lock();
        while !state.status.is_terminal() {
            self.inner.cond.wait(&mut state);
        }
        state.status
    }

    /// Produce an independent copy
    ///
    /// The copy shares no mutable state with the original: it starts `New`
    /// with its own completion signal, the same body bytes and a duplicated
    /// metadata map.
    pub fn copy(&self) -> Self {
        let state = self.inner.state.lock();
        Self::from_parts(state.body.clone(), state.meta.clone())
    }
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Message")
            .field("len", &state.body.len())
            .field("status", &state.status)
            .field("meta_keys", &state.meta.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "message_test.rs"]
mod message_test;
