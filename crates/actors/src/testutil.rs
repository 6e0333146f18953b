//! Shared helpers for actor tests

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use flowd_core::{
    Actor, ConfigGet, Context, CoreError, FatalFailure, Message, Result, Status, Value,
    SYSTEM_MAXPROCS,
};

/// Minimal config source backed by a map
pub(crate) struct TestConfig(HashMap<String, Value>);

impl ConfigGet for TestConfig {
    fn get(&self, key: &str) -> Option<Value> {
        self.0.get(key).cloned()
    }
}

/// Context with `system.maxprocs` set, keeping the failure receiver
pub(crate) fn test_context(
    maxprocs: usize,
) -> (Arc<Context>, mpsc::UnboundedReceiver<FatalFailure>) {
    let mut map = HashMap::new();
    map.insert(SYSTEM_MAXPROCS.to_owned(), Value::Int(maxprocs as i64));
    Context::new(Arc::new(TestConfig(map)))
}

/// Terminal test actor that records every received message
pub(crate) struct Collector {
    name: String,
    complete_with: Option<Status>,
    tx: mpsc::UnboundedSender<Message>,
}

/// Create a collector completing each message with `complete_with`
/// (pass `None` to leave completion to someone else)
pub(crate) fn collector(
    name: &str,
    complete_with: Option<Status>,
) -> (Arc<Collector>, mpsc::UnboundedReceiver<Message>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        Arc::new(Collector {
            name: name.to_owned(),
            complete_with,
            tx,
        }),
        rx,
    )
}

#[async_trait]
impl Actor for Collector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn connect(&self, _parallelism: usize, _peer: Arc<dyn Actor>) -> Result<()> {
        Err(CoreError::NotConnectable {
            actor: self.name.clone(),
        })
    }

    async fn receive(&self, msg: Message) -> Result<()> {
        if let Some(status) = self.complete_with {
            let _ = msg.complete(status);
        }
        let _ = self.tx.send(msg);
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        Ok(())
    }
}
