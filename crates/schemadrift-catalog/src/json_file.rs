//! Metadata source backed by a JSON file
//!
//! The file holds an array of rows in the snapshot shape
//! (`{"schema", "table", "column", "type", "position"}`), e.g. an export of
//! INFORMATION_SCHEMA.COLUMNS. Useful for offline captures and demos.

use crate::adapter::{FetchError, MetadataSource};
use schemadrift_core::{SnapshotColumn, SourceConfig};
use std::path::{Path, PathBuf};

/// Reads column rows from a JSON file on every capture
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Create a source for the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Build from the `[source]` table (`path` setting)
    pub fn from_config(config: &SourceConfig, root: &Path) -> Result<Self, FetchError> {
        let path = config
            .require("path")
            .map_err(|e| FetchError::ConfigError(e.to_string()))?;

        let path = Path::new(path);
        if path.is_relative() {
            Ok(Self::new(root.join(path)))
        } else {
            Ok(Self::new(path))
        }
    }

    /// File this source reads
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl MetadataSource for JsonFileSource {
    fn name(&self) -> &'static str {
        "JSON file"
    }

    async fn list_columns(&self) -> Result<Vec<SnapshotColumn>, FetchError> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            FetchError::NetworkError(format!("Cannot read {}: {}", self.path.display(), e))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            FetchError::InvalidResponse(format!("{}: {}", self.path.display(), e))
        })
    }

    async fn test_connection(&self) -> Result<(), FetchError> {
        tokio::fs::metadata(&self.path)
            .await
            .map(|_| ())
            .map_err(|e| FetchError::NetworkError(format!("Cannot access {}: {}", self.path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn reads_rows_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"schema":"PUBLIC","table":"ORDERS","column":"ID","type":"NUMBER","position":1}}]"#
        )
        .unwrap();

        let source = JsonFileSource::new(file.path());
        assert!(source.test_connection().await.is_ok());

        let rows = source.list_columns().await.unwrap();
        assert_eq!(rows, vec![SnapshotColumn::new("PUBLIC", "ORDERS", "ID", "NUMBER", 1)]);
    }

    #[tokio::test]
    async fn missing_file_is_a_source_failure() {
        let source = JsonFileSource::new("/nonexistent/columns.json");
        assert!(matches!(source.list_columns().await, Err(FetchError::NetworkError(_))));
        assert!(source.test_connection().await.is_err());
    }

    #[tokio::test]
    async fn malformed_file_is_invalid_response() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let source = JsonFileSource::new(file.path());
        assert!(matches!(source.list_columns().await, Err(FetchError::InvalidResponse(_))));
    }
}
