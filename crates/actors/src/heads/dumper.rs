//! Dumper head - appends payloads to a local file
//!
//! One payload per line. The file is opened on `connect`, so a deleted or
//! rotated-away file heals through the sink's reconnect path.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::{SinkHead, WriteError};

/// Head that appends each payload as a line to a file
pub struct DumperHead {
    path: PathBuf,

    /// Open file handle (protected by mutex for reconnection)
    file: Mutex<Option<File>>,
}

impl DumperHead {
    /// Create a dumper head writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: Mutex::new(None),
        }
    }
}

#[async_trait]
impl SinkHead for DumperHead {
    async fn connect(&self) -> io::Result<()> {
        let mut file = self.file.lock().await;
        file.take();

        let opened = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        tracing::debug!(path = %self.path.display(), "dumper head opened file");
        *file = Some(opened);
        Ok(())
    }

    async fn write(&self, payload: &[u8]) -> Result<usize, WriteError> {
        let mut file = self.file.lock().await;
        let handle = file.as_mut().ok_or_else(WriteError::not_connected)?;

        let result = async {
            handle.write_all(payload).await?;
            handle.write_all(b"\n").await?;
            handle.flush().await?;
            Ok::<(), io::Error>(())
        }
        .await;

        match result {
            Ok(()) => Ok(payload.len() + 1),
            Err(e) => {
                // A failed handle is useless; force a reopen.
                file.take();
                Err(WriteError::reconnect(e))
            }
        }
    }

    async fn start(&self) -> io::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> io::Result<()> {
        let mut file = self.file.lock().await;
        if let Some(mut handle) = file.take() {
            handle.flush().await?;
        }
        Ok(())
    }
}
