//! Dated, immutable column inventories

use crate::schema::{ColumnKey, ColumnMetadata, SnapshotColumn, TableRef};
use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

/// Errors while (de)serializing a snapshot
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Full column inventory of the warehouse on one date
///
/// A snapshot cannot be mutated once built. Columns are keyed by
/// [`ColumnKey`]; if the input contains the same key twice, the last row wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    date: NaiveDate,
    columns: BTreeMap<ColumnKey, ColumnMetadata>,
}

impl Snapshot {
    /// Build a snapshot from source rows (in any order)
    pub fn from_columns(date: NaiveDate, columns: impl IntoIterator<Item = SnapshotColumn>) -> Self {
        let columns = columns.into_iter().map(SnapshotColumn::into_parts).collect();
        Self { date, columns }
    }

    /// Parse the persisted JSON array for a given date
    pub fn from_json(date: NaiveDate, json: &str) -> Result<Self, SnapshotError> {
        let rows: Vec<SnapshotColumn> = serde_json::from_str(json)?;
        Ok(Self::from_columns(date, rows))
    }

    /// Serialize to the persisted JSON array
    ///
    /// Rows are emitted ordered by schema, table and ordinal position.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(&self.rows())?)
    }

    /// Snapshot rows ordered by schema, table, ordinal position
    pub fn rows(&self) -> Vec<SnapshotColumn> {
        let mut rows: Vec<SnapshotColumn> = self
            .columns
            .iter()
            .map(|(key, metadata)| SnapshotColumn::from_parts(key, metadata))
            .collect();

        rows.sort_by(|a, b| {
            (&a.schema, &a.table, a.position, &a.column)
                .cmp(&(&b.schema, &b.table, b.position, &b.column))
        });
        rows
    }

    /// Capture date
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the snapshot holds no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column keys in `(schema, table, column)` order
    pub fn keys(&self) -> impl Iterator<Item = &ColumnKey> {
        self.columns.keys()
    }

    /// Whether a column is present
    pub fn contains(&self, key: &ColumnKey) -> bool {
        self.columns.contains_key(key)
    }

    /// Metadata for a column
    pub fn metadata(&self, key: &ColumnKey) -> Option<&ColumnMetadata> {
        self.columns.get(key)
    }

    /// Iterate over `(key, metadata)` pairs
    pub fn columns(&self) -> impl Iterator<Item = (&ColumnKey, &ColumnMetadata)> {
        self.columns.iter()
    }

    /// Distinct `(schema, table)` pairs
    pub fn tables(&self) -> BTreeSet<TableRef> {
        self.columns.keys().map(ColumnKey::table_ref).collect()
    }

    /// SHA-256 of the sorted key set (hex)
    ///
    /// Metadata is not hashed: two snapshots with the same keys always share
    /// a fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for key in self.columns.keys() {
            hasher.update(key.schema.as_bytes());
            hasher.update([0x1f]);
            hasher.update(key.table.as_bytes());
            hasher.update([0x1f]);
            hasher.update(key.column.as_bytes());
            hasher.update([0x1e]);
        }
        hex::encode(hasher.finalize())
    }
}
