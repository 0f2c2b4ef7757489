//! Mock metadata source for testing
//!
//! This source returns predefined columns without connecting to any warehouse.
//! It's useful for:
//! - Unit testing capture and drift detection
//! - Simulating schema changes between two captures
//! - Simulating source failures and slow sources
//!
//! ## Usage
//!
//! ```rust,ignore
//! use schemadrift_catalog::{MockSource, MetadataSource};
//! use schemadrift_core::SnapshotColumn;
//!
//! let source = MockSource::from_columns(vec![
//!     SnapshotColumn::new("PUBLIC", "ORDERS", "ID", "NUMBER", 1),
//! ]);
//!
//! // Simulate a column being added between two captures
//! source.add_column(SnapshotColumn::new("PUBLIC", "ORDERS", "STATUS", "TEXT", 2)).await;
//! ```

use crate::adapter::{FetchError, MetadataSource};
use schemadrift_core::SnapshotColumn;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Mock metadata source for testing
///
/// Clones share the same column list and error slot, so a test can keep a
/// handle and mutate the "warehouse" between captures.
#[derive(Clone)]
pub struct MockSource {
    /// Rows returned by `list_columns`
    columns: Arc<RwLock<Vec<SnapshotColumn>>>,

    /// Error returned instead of rows, when set
    error: Arc<RwLock<Option<FetchError>>>,

    /// Simulate connection failure
    fail_connection: bool,

    /// Simulate query latency (milliseconds)
    latency_ms: u64,

    /// Name to return from name() method
    source_name: &'static str,
}

impl MockSource {
    /// Create a new mock source with no columns
    pub fn new() -> Self {
        Self::from_columns(Vec::new())
    }

    /// Create a mock source returning the given rows
    pub fn from_columns(columns: Vec<SnapshotColumn>) -> Self {
        Self {
            columns: Arc::new(RwLock::new(columns)),
            error: Arc::new(RwLock::new(None)),
            fail_connection: false,
            latency_ms: 0,
            source_name: "Mock",
        }
    }

    /// Replace every row
    pub async fn set_columns(&self, columns: Vec<SnapshotColumn>) {
        *self.columns.write().await = columns;
    }

    /// Add a row
    pub async fn add_column(&self, column: SnapshotColumn) {
        self.columns.write().await.push(column);
    }

    /// Remove every row matching the given column identity
    pub async fn remove_column(&self, schema: &str, table: &str, column: &str) {
        self.columns
            .write()
            .await
            .retain(|c| !(c.schema == schema && c.table == table && c.column == column));
    }

    /// Make `list_columns` fail with the given error
    pub async fn fail_with(&self, error: FetchError) {
        *self.error.write().await = Some(error);
    }

    /// Stop failing
    pub async fn clear_error(&self) {
        *self.error.write().await = None;
    }

    /// Configure to fail all connection tests
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Configure simulated latency for all operations
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Set a custom source name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.source_name = name;
        self
    }

    /// Get the number of rows stored in the source
    pub async fn column_count(&self) -> usize {
        self.columns.read().await.len()
    }

    /// Simulate latency if configured
    async fn simulate_latency(&self) {
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MetadataSource for MockSource {
    fn name(&self) -> &'static str {
        self.source_name
    }

    async fn list_columns(&self) -> Result<Vec<SnapshotColumn>, FetchError> {
        self.simulate_latency().await;

        if let Some(error) = self.error.read().await.as_ref() {
            return Err(error.clone());
        }

        Ok(self.columns.read().await.clone())
    }

    async fn test_connection(&self) -> Result<(), FetchError> {
        self.simulate_latency().await;

        if self.fail_connection {
            Err(FetchError::NetworkError(
                "Simulated connection failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}
