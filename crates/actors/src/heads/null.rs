//! Null head - accepts and discards every payload
//!
//! Useful for benchmarking the pipeline itself and as the terminal head in
//! tests.

use std::io;

use async_trait::async_trait;

use super::{SinkHead, WriteError};

/// Head that swallows all writes
#[derive(Debug, Default)]
pub struct NullHead;

impl NullHead {
    /// Create a null head
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SinkHead for NullHead {
    async fn connect(&self) -> io::Result<()> {
        Ok(())
    }

    async fn write(&self, payload: &[u8]) -> Result<usize, WriteError> {
        Ok(payload.len())
    }

    async fn start(&self) -> io::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_head_accepts_everything() {
        let head = NullHead::new();
        head.connect().await.unwrap();
        assert_eq!(head.write(b"payload").await.unwrap(), 7);
        head.stop().await.unwrap();
    }
}
