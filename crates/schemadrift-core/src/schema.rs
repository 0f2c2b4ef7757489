//! Column identity and the on-disk column record

use serde::{Deserialize, Serialize};

/// Identity of a warehouse column
///
/// Two columns are the same column when schema, table and column name all
/// match. Data type and position are deliberately not part of the key.
/// The derived ordering sorts by `(schema, table, column)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnKey {
    /// Schema name
    pub schema: String,

    /// Table name
    pub table: String,

    /// Column name
    pub column: String,
}

impl ColumnKey {
    /// Create a new column key
    pub fn new(schema: impl Into<String>, table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            column: column.into(),
        }
    }

    /// Get fully qualified name (`schema.table.column`)
    pub fn fqn(&self) -> String {
        format!("{}.{}.{}", self.schema, self.table, self.column)
    }

    /// The `(schema, table)` pair this column belongs to
    pub fn table_ref(&self) -> TableRef {
        TableRef::new(&self.schema, &self.table)
    }
}

impl std::fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.schema, self.table, self.column)
    }
}

/// A `(schema, table)` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableRef {
    /// Schema name
    pub schema: String,

    /// Table name
    pub table: String,
}

impl TableRef {
    /// Create a new table reference
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Display-only column metadata
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Warehouse data type as reported by the source (e.g. `NUMBER`, `TEXT`)
    pub data_type: String,

    /// 1-indexed ordinal position within the table
    pub ordinal_position: u32,
}

impl ColumnMetadata {
    /// Create new column metadata
    pub fn new(data_type: impl Into<String>, ordinal_position: u32) -> Self {
        Self {
            data_type: data_type.into(),
            ordinal_position,
        }
    }
}

/// One row of a snapshot as stored on disk
///
/// Field names are part of the persisted format and must not change:
/// `{"schema", "table", "column", "type", "position"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotColumn {
    /// Schema name
    pub schema: String,

    /// Table name
    pub table: String,

    /// Column name
    pub column: String,

    /// Warehouse data type
    #[serde(rename = "type")]
    pub data_type: String,

    /// Ordinal position
    pub position: u32,
}

impl SnapshotColumn {
    /// Create a new snapshot row
    pub fn new(
        schema: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
        data_type: impl Into<String>,
        position: u32,
    ) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            column: column.into(),
            data_type: data_type.into(),
            position,
        }
    }

    /// Split the row into its identity and its metadata
    pub fn into_parts(self) -> (ColumnKey, ColumnMetadata) {
        (
            ColumnKey {
                schema: self.schema,
                table: self.table,
                column: self.column,
            },
            ColumnMetadata {
                data_type: self.data_type,
                ordinal_position: self.position,
            },
        )
    }

    /// Rebuild a row from identity and metadata
    pub fn from_parts(key: &ColumnKey, metadata: &ColumnMetadata) -> Self {
        Self {
            schema: key.schema.clone(),
            table: key.table.clone(),
            column: key.column.clone(),
            data_type: metadata.data_type.clone(),
            position: metadata.ordinal_position,
        }
    }
}
