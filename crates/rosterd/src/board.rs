//! Append-only message board persisted as a JSON file.
//!
//! Storage faults never reach HTTP callers: a failed read degrades to an
//! empty board and a failed write is logged while the post still succeeds.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error};

use roster_core::{BoardMessage, DomainResult};

/// File-backed message board.
///
/// Appends are serialized through a mutex so concurrent posts cannot
/// overwrite each other's read-modify-write.
#[derive(Debug)]
pub struct MessageBoard {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl MessageBoard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored messages in posting order; empty on any read failure.
    pub async fn list(&self) -> Vec<BoardMessage> {
        match self.read().await {
            Ok(messages) => messages,
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "Error reading messages");
                Vec::new()
            }
        }
    }

    /// Validates and appends a new message stamped with the current time.
    ///
    /// # Errors
    ///
    /// `DomainError::MissingField` if `text` is absent or empty. Storage
    /// failures are logged, not returned.
    pub async fn post(&self, text: Option<&str>) -> DomainResult<BoardMessage> {
        let message = BoardMessage::post(text)?;

        let _guard = self.write_lock.lock().await;
        let mut messages = self.list().await;
        messages.push(message.clone());

        if let Err(e) = self.write(&messages).await {
            error!(path = %self.path.display(), error = %e, "Error writing messages");
        } else {
            debug!(total = messages.len(), "Message appended");
        }

        Ok(message)
    }

    async fn read(&self) -> Result<Vec<BoardMessage>, BoardError> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    async fn write(&self, messages: &[BoardMessage]) -> Result<(), BoardError> {
        let json = serde_json::to_string_pretty(messages)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

/// Storage errors, logged by [`MessageBoard`].
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
