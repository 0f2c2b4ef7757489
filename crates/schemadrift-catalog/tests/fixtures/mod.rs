//! Test fixtures for metadata source integration tests
//!
//! Column listings shaped like real INFORMATION_SCHEMA.COLUMNS output,
//! deliberately unordered to catch any reliance on row order.

use schemadrift_core::SnapshotColumn;

/// A small e-commerce warehouse
pub fn warehouse_columns() -> Vec<SnapshotColumn> {
    vec![
        SnapshotColumn::new("PUBLIC", "ORDERS", "STATUS", "TEXT", 3),
        SnapshotColumn::new("PUBLIC", "USERS", "ID", "NUMBER", 1),
        SnapshotColumn::new("PUBLIC", "ORDERS", "ID", "NUMBER", 1),
        SnapshotColumn::new("PUBLIC", "USERS", "EMAIL", "TEXT", 2),
        SnapshotColumn::new("PUBLIC", "ORDERS", "USER_ID", "NUMBER", 2),
        SnapshotColumn::new("STAGING", "RAW_EVENTS", "PAYLOAD", "VARIANT", 1),
    ]
}

/// System rows that must never reach a snapshot
pub fn system_columns() -> Vec<SnapshotColumn> {
    vec![
        SnapshotColumn::new("INFORMATION_SCHEMA", "COLUMNS", "TABLE_SCHEMA", "TEXT", 2),
        SnapshotColumn::new("INFORMATION_SCHEMA", "TABLES", "TABLE_NAME", "TEXT", 3),
    ]
}
