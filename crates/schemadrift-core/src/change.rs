//! Change classification
//!
//! IMPORTANT: Change codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the report format.

use crate::schema::ColumnKey;
use serde::{Deserialize, Serialize};

/// Kind of a single column-level change (v1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    /// Column present in the new snapshot, absent in the base
    DriftColumnAdded,

    /// Column present in the base snapshot, absent in the new one
    DriftColumnRemoved,
}

impl ChangeKind {
    /// Stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DriftColumnAdded => "DRIFT_COLUMN_ADDED",
            Self::DriftColumnRemoved => "DRIFT_COLUMN_REMOVED",
        }
    }

    /// Single-character marker used in listings
    pub fn marker(&self) -> char {
        match self {
            Self::DriftColumnAdded => '+',
            Self::DriftColumnRemoved => '-',
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A classified column change
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Change {
    /// Stable change code
    pub kind: ChangeKind,

    /// Column affected
    pub key: ColumnKey,
}

impl Change {
    /// Column added
    pub fn added(key: ColumnKey) -> Self {
        Self {
            kind: ChangeKind::DriftColumnAdded,
            key,
        }
    }

    /// Column removed
    pub fn removed(key: ColumnKey) -> Self {
        Self {
            kind: ChangeKind::DriftColumnRemoved,
            key,
        }
    }
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind.marker(), self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_code_stability() {
        assert_eq!(ChangeKind::DriftColumnAdded.as_str(), "DRIFT_COLUMN_ADDED");
        assert_eq!(ChangeKind::DriftColumnRemoved.as_str(), "DRIFT_COLUMN_REMOVED");
    }

    #[test]
    fn change_serialization() {
        let change = Change::removed(ColumnKey::new("PUBLIC", "ORDERS", "LEGACY_FLAG"));
        let json = serde_json::to_string(&change).unwrap();

        assert!(json.contains("DRIFT_COLUMN_REMOVED"));
        assert!(json.contains("LEGACY_FLAG"));
        assert_eq!(change.to_string(), "- PUBLIC.ORDERS.LEGACY_FLAG");
    }
}
