//! Change log trait

use chrono::NaiveDate;
use schemadrift_core::ChangeLogEntry;

/// Errors raised while recording drift events
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("No drift between {base_date} and {new_date}; nothing to record")]
    NoDrift {
        base_date: NaiveDate,
        new_date: NaiveDate,
    },

    #[error("Change log write failed: {0}")]
    Write(#[from] std::io::Error),

    #[error("Change log entry could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Append-only log of drift events
#[async_trait::async_trait]
pub trait ChangeLog: Send + Sync {
    /// Append one entry; either the whole entry is stored or nothing is
    async fn append(&self, entry: &ChangeLogEntry) -> Result<(), LogError>;

    /// Every recorded entry, oldest first
    async fn entries(&self) -> Result<Vec<ChangeLogEntry>, LogError>;
}
