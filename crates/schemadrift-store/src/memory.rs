//! In-memory stores
//!
//! Used by tests and by callers that do not need durability. Clones share
//! the same underlying data.

use crate::changelog::{ChangeLog, LogError};
use crate::snapshot_store::{SnapshotStore, StoreError};
use chrono::NaiveDate;
use schemadrift_core::{ChangeLogEntry, Snapshot};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Snapshot store backed by a map
#[derive(Clone, Default)]
pub struct InMemorySnapshotStore {
    snapshots: Arc<RwLock<BTreeMap<NaiveDate, Snapshot>>>,
}

impl InMemorySnapshotStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots
    pub async fn len(&self) -> usize {
        self.snapshots.read().await.len()
    }

    /// Whether no snapshot is stored
    pub async fn is_empty(&self) -> bool {
        self.snapshots.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let mut snapshots = self.snapshots.write().await;
        if snapshots.contains_key(&snapshot.date()) {
            return Err(StoreError::DuplicateDate(snapshot.date()));
        }
        snapshots.insert(snapshot.date(), snapshot.clone());
        Ok(())
    }

    async fn replace(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        self.snapshots.write().await.insert(snapshot.date(), snapshot.clone());
        Ok(())
    }

    async fn load(&self, date: NaiveDate) -> Result<Snapshot, StoreError> {
        self.snapshots
            .read()
            .await
            .get(&date)
            .cloned()
            .ok_or(StoreError::NotFound(date))
    }

    async fn dates(&self) -> Result<Vec<NaiveDate>, StoreError> {
        Ok(self.snapshots.read().await.keys().copied().collect())
    }
}

/// Change log backed by a vector
#[derive(Clone, Default)]
pub struct InMemoryChangeLog {
    entries: Arc<RwLock<Vec<ChangeLogEntry>>>,
    fail_writes: bool,
}

impl InMemoryChangeLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every append with an I/O error
    pub fn with_write_failure(mut self) -> Self {
        self.fail_writes = true;
        self
    }
}

#[async_trait::async_trait]
impl ChangeLog for InMemoryChangeLog {
    async fn append(&self, entry: &ChangeLogEntry) -> Result<(), LogError> {
        if self.fail_writes {
            return Err(LogError::Write(std::io::Error::new(
                std::io::ErrorKind::Other,
                "Simulated write failure",
            )));
        }
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn entries(&self) -> Result<Vec<ChangeLogEntry>, LogError> {
        Ok(self.entries.read().await.clone())
    }
}
