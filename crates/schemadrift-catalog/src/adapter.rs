//! Metadata source trait for listing warehouse columns

use schemadrift_core::SnapshotColumn;

/// Errors that can occur when querying a metadata source
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Query failed: {0}")]
    QueryError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// A source of column metadata for a whole warehouse
///
/// Implementations return every visible column with schema, table, column,
/// data type and ordinal position. Row order carries no meaning.
#[async_trait::async_trait]
pub trait MetadataSource: Send + Sync {
    /// Get the source name (e.g., "Snowflake")
    fn name(&self) -> &'static str;

    /// List all columns
    ///
    /// This should query the warehouse's INFORMATION_SCHEMA (or equivalent)
    /// in a single pass.
    async fn list_columns(&self) -> Result<Vec<SnapshotColumn>, FetchError>;

    /// Test the connection to the source
    ///
    /// This is useful for validating credentials before a capture.
    async fn test_connection(&self) -> Result<(), FetchError>;
}
