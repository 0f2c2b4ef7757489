//! Schema capture: turn a metadata source listing into a dated snapshot

use crate::adapter::{FetchError, MetadataSource};
use chrono::NaiveDate;
use schemadrift_core::{CaptureConfig, Snapshot};
use std::sync::Arc;

/// Errors that abort a capture
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Metadata source '{source_name}' unavailable: {cause}")]
    SourceUnavailable {
        source_name: &'static str,
        #[source]
        cause: FetchError,
    },
}

/// Captures the current column inventory of a warehouse
///
/// The capturer only reads; persisting the snapshot is the store's job.
pub struct SchemaCapturer {
    source: Arc<dyn MetadataSource>,
    config: CaptureConfig,
}

impl SchemaCapturer {
    /// Create a capturer over a metadata source
    pub fn new(source: Arc<dyn MetadataSource>, config: CaptureConfig) -> Self {
        Self { source, config }
    }

    /// Name of the underlying source
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Capture a snapshot keyed at `date`
    ///
    /// Rows from excluded schemas are dropped. A failing source, or one that
    /// returns no columns at all, fails the whole capture.
    pub async fn capture(&self, date: NaiveDate) -> Result<Snapshot, CaptureError> {
        let source_name = self.source.name();

        let rows = self.source
            .list_columns()
            .await
            .map_err(|cause| CaptureError::SourceUnavailable { source_name, cause })?;

        let total = rows.len();
        let kept: Vec<_> = rows
            .into_iter()
            .filter(|row| !self.config.is_schema_excluded(&row.schema))
            .collect();

        if kept.is_empty() {
            return Err(CaptureError::SourceUnavailable {
                source_name,
                cause: FetchError::InvalidResponse(format!(
                    "no columns returned ({} rows before schema exclusion)",
                    total
                )),
            });
        }

        let snapshot = Snapshot::from_columns(date, kept);

        tracing::info!(
            source = source_name,
            %date,
            columns = snapshot.len(),
            excluded = total - snapshot.len(),
            "captured schema snapshot"
        );

        Ok(snapshot)
    }

    /// Capture a snapshot keyed at the local current date
    pub async fn capture_today(&self) -> Result<Snapshot, CaptureError> {
        self.capture(chrono::Local::now().date_naive()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSource;
    use schemadrift_core::{ColumnKey, SnapshotColumn};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn captures_and_filters_system_schemas() {
        let source = MockSource::from_columns(vec![
            SnapshotColumn::new("PUBLIC", "ORDERS", "ID", "NUMBER", 1),
            SnapshotColumn::new("INFORMATION_SCHEMA", "COLUMNS", "TABLE_NAME", "TEXT", 3),
        ]);
        let capturer = SchemaCapturer::new(Arc::new(source), CaptureConfig::default());

        let snapshot = capturer.capture(date("2024-05-01")).await.unwrap();

        assert_eq!(snapshot.date(), date("2024-05-01"));
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains(&ColumnKey::new("PUBLIC", "ORDERS", "ID")));
    }

    #[tokio::test]
    async fn source_failure_is_source_unavailable() {
        let source = MockSource::new();
        source.fail_with(FetchError::NetworkError("connection reset".to_string())).await;
        let capturer = SchemaCapturer::new(Arc::new(source), CaptureConfig::default());

        let err = capturer.capture(date("2024-05-01")).await.unwrap_err();
        assert!(matches!(
            err,
            CaptureError::SourceUnavailable { cause: FetchError::NetworkError(_), .. }
        ));
        assert!(err.to_string().contains("Mock"));
    }

    #[tokio::test]
    async fn empty_listing_is_source_unavailable() {
        let source = MockSource::from_columns(vec![
            SnapshotColumn::new("INFORMATION_SCHEMA", "TABLES", "TABLE_NAME", "TEXT", 1),
        ]);
        let capturer = SchemaCapturer::new(Arc::new(source), CaptureConfig::default());

        let err = capturer.capture(date("2024-05-01")).await.unwrap_err();
        assert!(err.to_string().contains("no columns returned"));
    }

    #[tokio::test]
    async fn repeated_capture_is_identical() {
        let source = MockSource::from_columns(vec![
            SnapshotColumn::new("PUBLIC", "ORDERS", "STATUS", "TEXT", 2),
            SnapshotColumn::new("PUBLIC", "ORDERS", "ID", "NUMBER", 1),
        ]);
        let capturer = SchemaCapturer::new(Arc::new(source), CaptureConfig::default());

        let first = capturer.capture(date("2024-05-01")).await.unwrap();
        let second = capturer.capture(date("2024-05-01")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.fingerprint(), second.fingerprint());
    }
}
