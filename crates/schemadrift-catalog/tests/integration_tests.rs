//! Integration tests for metadata sources and schema capture
//!
//! Tests requiring actual warehouse credentials are marked with `#[ignore]`
//! and can be run with `cargo test -- --ignored`.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all non-ignored tests (no credentials required)
//! cargo test -p schemadrift-catalog --test integration_tests
//!
//! # Run Snowflake integration tests
//! SNOWFLAKE_ACCOUNT=xy12345 \
//! SNOWFLAKE_USER=user \
//! SNOWFLAKE_PASSWORD=pass \
//! SNOWFLAKE_DATABASE=RAW \
//! cargo test -p schemadrift-catalog --features snowflake --test integration_tests -- --ignored
//! ```

mod fixtures;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use schemadrift_catalog::{
    CaptureError, FetchError, JsonFileSource, MetadataSource, MockSource, SchemaCapturer,
};
use schemadrift_core::{CaptureConfig, ColumnKey, Snapshot, SnapshotColumn};
use std::sync::Arc;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// Check if Snowflake credentials are available
#[cfg_attr(not(feature = "snowflake"), allow(dead_code))]
fn has_snowflake_credentials() -> bool {
    std::env::var("SNOWFLAKE_ACCOUNT").is_ok()
}

// =============================================================================
// Mock Source Tests (No credentials required)
// =============================================================================

#[tokio::test]
async fn test_capture_ignores_row_order() {
    let forward = MockSource::from_columns(fixtures::warehouse_columns());

    let mut reversed_rows = fixtures::warehouse_columns();
    reversed_rows.reverse();
    let reversed = MockSource::from_columns(reversed_rows);

    let a = SchemaCapturer::new(Arc::new(forward), CaptureConfig::default())
        .capture(date("2024-05-01"))
        .await
        .unwrap();
    let b = SchemaCapturer::new(Arc::new(reversed), CaptureConfig::default())
        .capture(date("2024-05-01"))
        .await
        .unwrap();

    assert_eq!(a, b);
    assert_eq!(a.len(), 6);
}

#[tokio::test]
async fn test_capture_excludes_configured_schemas() {
    let mut rows = fixtures::warehouse_columns();
    rows.extend(fixtures::system_columns());
    let source = MockSource::from_columns(rows);

    let config = CaptureConfig {
        exclude_schemas: vec!["INFORMATION_SCHEMA".to_string(), "STAGING*".to_string()],
    };
    let snapshot = SchemaCapturer::new(Arc::new(source), config)
        .capture(date("2024-05-01"))
        .await
        .unwrap();

    assert_eq!(snapshot.len(), 5);
    assert!(snapshot.keys().all(|k| k.schema == "PUBLIC"));
}

#[tokio::test]
async fn test_capture_sees_warehouse_changes() {
    let source = MockSource::from_columns(fixtures::warehouse_columns());
    let capturer = SchemaCapturer::new(Arc::new(source.clone()), CaptureConfig::default());

    let before = capturer.capture(date("2024-05-01")).await.unwrap();

    source.add_column(SnapshotColumn::new("PUBLIC", "ORDERS", "SHIPPED_AT", "TIMESTAMP_NTZ", 4)).await;
    source.remove_column("PUBLIC", "USERS", "EMAIL").await;

    let after = capturer.capture(date("2024-05-02")).await.unwrap();

    assert!(!before.contains(&ColumnKey::new("PUBLIC", "ORDERS", "SHIPPED_AT")));
    assert!(after.contains(&ColumnKey::new("PUBLIC", "ORDERS", "SHIPPED_AT")));
    assert!(!after.contains(&ColumnKey::new("PUBLIC", "USERS", "EMAIL")));
    assert_ne!(before.fingerprint(), after.fingerprint());
}

#[tokio::test]
async fn test_capture_permission_denied() {
    let source = MockSource::new().with_name("Snowflake");
    source
        .fail_with(FetchError::PermissionDenied("role LOADER lacks USAGE".to_string()))
        .await;

    let err = SchemaCapturer::new(Arc::new(source), CaptureConfig::default())
        .capture(date("2024-05-01"))
        .await
        .unwrap_err();

    let CaptureError::SourceUnavailable { source_name, cause } = err;
    assert_eq!(source_name, "Snowflake");
    assert!(matches!(cause, FetchError::PermissionDenied(_)));
}

#[tokio::test]
async fn test_mock_source_latency_simulation() {
    let source = MockSource::from_columns(fixtures::warehouse_columns()).with_latency(100);

    let start = std::time::Instant::now();
    let _ = source.list_columns().await;
    let elapsed = start.elapsed();

    assert!(elapsed.as_millis() >= 100);
}

// =============================================================================
// JSON File Source Tests
// =============================================================================

#[tokio::test]
async fn test_json_file_source_reads_snapshot_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("columns.json");

    // A snapshot's own JSON is valid source input
    let original = Snapshot::from_columns(date("2024-05-01"), fixtures::warehouse_columns());
    std::fs::write(&path, original.to_json().unwrap()).unwrap();

    let capturer = SchemaCapturer::new(Arc::new(JsonFileSource::new(&path)), CaptureConfig::default());
    let recaptured = capturer.capture(date("2024-05-01")).await.unwrap();

    assert_eq!(recaptured, original);
}

// =============================================================================
// Snowflake Tests (credentials required)
// =============================================================================

#[cfg(feature = "snowflake")]
#[tokio::test]
#[ignore]
async fn test_snowflake_capture() {
    use schemadrift_catalog::SnowflakeSource;

    if !has_snowflake_credentials() {
        eprintln!("Skipping: SNOWFLAKE_ACCOUNT not set");
        return;
    }

    let env = |key: &str| std::env::var(key).unwrap_or_default();
    let source = SnowflakeSource::builder()
        .with_password(env("SNOWFLAKE_ACCOUNT"), env("SNOWFLAKE_USER"), env("SNOWFLAKE_PASSWORD"))
        .with_database(env("SNOWFLAKE_DATABASE"))
        .build()
        .unwrap();

    source.test_connection().await.unwrap();

    let snapshot = SchemaCapturer::new(Arc::new(source), CaptureConfig::default())
        .capture_today()
        .await
        .unwrap();

    assert!(!snapshot.is_empty());
    assert!(snapshot.keys().all(|k| k.schema != "INFORMATION_SCHEMA"));
}
