//! Drift reports: what changed between two snapshots

use crate::change::Change;
use crate::schema::{ColumnKey, TableRef};
use crate::snapshot::Snapshot;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Result of comparing a base snapshot against a newer one
///
/// Direction matters: `removed` means present in the base and absent in the
/// new snapshot. `added` and `removed` are always disjoint. Both sets are
/// ordered by `(schema, table, column)`, which makes every rendering of a
/// report deterministic.
///
/// The column sets can only be built by set difference, so a report never
/// holds a key on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftReport {
    /// Date of the base snapshot
    pub base_date: NaiveDate,

    /// Date of the new snapshot
    pub new_date: NaiveDate,

    added: BTreeSet<ColumnKey>,
    removed: BTreeSet<ColumnKey>,
}

impl DriftReport {
    /// Compare two snapshots
    pub fn between(base: &Snapshot, new: &Snapshot) -> Self {
        Self {
            base_date: base.date(),
            new_date: new.date(),
            added: new.keys().filter(|k| !base.contains(k)).cloned().collect(),
            removed: base.keys().filter(|k| !new.contains(k)).cloned().collect(),
        }
    }

    /// Compare two bare key sets
    pub fn from_key_sets(
        base_date: NaiveDate,
        new_date: NaiveDate,
        base: &BTreeSet<ColumnKey>,
        new: &BTreeSet<ColumnKey>,
    ) -> Self {
        Self {
            base_date,
            new_date,
            added: new.difference(base).cloned().collect(),
            removed: base.difference(new).cloned().collect(),
        }
    }

    /// A report with no drift
    pub fn no_drift(base_date: NaiveDate, new_date: NaiveDate) -> Self {
        Self {
            base_date,
            new_date,
            added: BTreeSet::new(),
            removed: BTreeSet::new(),
        }
    }

    /// Columns present in new, absent in base
    pub fn added(&self) -> &BTreeSet<ColumnKey> {
        &self.added
    }

    /// Columns present in base, absent in new
    pub fn removed(&self) -> &BTreeSet<ColumnKey> {
        &self.removed
    }

    /// True when nothing was added or removed
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// True when at least one column was added or removed
    pub fn has_drift(&self) -> bool {
        !self.is_empty()
    }

    /// All changes, additions first, each group in key order
    pub fn changes(&self) -> Vec<Change> {
        self.added
            .iter()
            .cloned()
            .map(Change::added)
            .chain(self.removed.iter().cloned().map(Change::removed))
            .collect()
    }

    /// Tables with at least one added or removed column
    pub fn affected_tables(&self) -> BTreeSet<TableRef> {
        self.added
            .iter()
            .chain(self.removed.iter())
            .map(ColumnKey::table_ref)
            .collect()
    }

    /// Counts for display
    pub fn summary(&self) -> DriftSummary {
        DriftSummary {
            added: self.added.len(),
            removed: self.removed.len(),
            tables_affected: self.affected_tables().len(),
        }
    }

    /// Group changes per table
    ///
    /// The table inventories of the two snapshots tell a brand-new or fully
    /// dropped table apart from a table that merely gained or lost columns.
    pub fn by_table(
        &self,
        base_tables: &BTreeSet<TableRef>,
        new_tables: &BTreeSet<TableRef>,
    ) -> Vec<TableDrift> {
        let mut grouped: BTreeMap<TableRef, (Vec<String>, Vec<String>)> = BTreeMap::new();

        for key in &self.added {
            grouped.entry(key.table_ref()).or_default().0.push(key.column.clone());
        }
        for key in &self.removed {
            grouped.entry(key.table_ref()).or_default().1.push(key.column.clone());
        }

        grouped
            .into_iter()
            .map(|(table, (added, removed))| {
                let status = match (base_tables.contains(&table), new_tables.contains(&table)) {
                    (false, true) => TableStatus::New,
                    (true, false) => TableStatus::Dropped,
                    _ => TableStatus::Modified,
                };

                TableDrift {
                    schema: table.schema,
                    table: table.table,
                    status,
                    added,
                    removed,
                }
            })
            .collect()
    }

    /// Render the added columns for the narrative prompt
    pub fn render_added(&self) -> String {
        render_list(&self.added)
    }

    /// Render the removed columns for the narrative prompt
    pub fn render_removed(&self) -> String {
        render_list(&self.removed)
    }
}

/// Render a key set as `- schema.table.column` lines
///
/// The output is stable: the same set always renders to the same string.
/// An empty set renders as an empty string.
pub fn render_list(keys: &BTreeSet<ColumnKey>) -> String {
    keys.iter()
        .map(|key| format!("- {}", key))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Change counts of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DriftSummary {
    /// Number of added columns
    pub added: usize,

    /// Number of removed columns
    pub removed: usize,

    /// Number of tables with at least one change
    pub tables_affected: usize,
}

/// How a table changed between the two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    /// Table did not exist in the base snapshot
    New,

    /// Table no longer exists in the new snapshot
    Dropped,

    /// Table exists in both snapshots with a different column set
    Modified,
}

impl std::fmt::Display for TableStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Dropped => write!(f, "dropped"),
            Self::Modified => write!(f, "modified"),
        }
    }
}

/// Changes of a single table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDrift {
    /// Schema name
    pub schema: String,

    /// Table name
    pub table: String,

    /// Table-level classification
    pub status: TableStatus,

    /// Added column names
    pub added: Vec<String>,

    /// Removed column names
    pub removed: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ChangeKind;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn keys(keys: &[(&str, &str, &str)]) -> BTreeSet<ColumnKey> {
        keys.iter().map(|(s, t, c)| ColumnKey::new(*s, *t, *c)).collect()
    }

    fn sample_report() -> DriftReport {
        DriftReport::from_key_sets(
            date("2024-05-01"),
            date("2024-05-02"),
            &keys(&[("PUBLIC", "ORDERS", "ID"), ("PUBLIC", "ORDERS", "LEGACY_FLAG")]),
            &keys(&[
                ("PUBLIC", "ORDERS", "ID"),
                ("PUBLIC", "ORDERS", "STATUS"),
                ("PUBLIC", "INVOICES", "ID"),
            ]),
        )
    }

    #[test]
    fn empty_report() {
        let report = DriftReport::no_drift(date("2024-05-01"), date("2024-05-02"));
        assert!(report.is_empty());
        assert!(!report.has_drift());
        assert!(report.changes().is_empty());
        assert_eq!(report.summary(), DriftSummary::default());
        assert_eq!(report.render_added(), "");
    }

    #[test]
    fn shared_keys_are_never_reported() {
        let report = sample_report();

        assert!(report.added().is_disjoint(report.removed()));
        assert!(!report.added().contains(&ColumnKey::new("PUBLIC", "ORDERS", "ID")));
        assert!(!report.removed().contains(&ColumnKey::new("PUBLIC", "ORDERS", "ID")));
    }

    #[test]
    fn snapshots_and_key_sets_agree() {
        use crate::schema::SnapshotColumn;

        let base = Snapshot::from_columns(
            date("2024-05-01"),
            vec![
                SnapshotColumn::new("PUBLIC", "ORDERS", "ID", "NUMBER", 1),
                SnapshotColumn::new("PUBLIC", "ORDERS", "LEGACY_FLAG", "BOOLEAN", 2),
            ],
        );
        let new = Snapshot::from_columns(
            date("2024-05-02"),
            vec![
                SnapshotColumn::new("PUBLIC", "ORDERS", "ID", "NUMBER", 1),
                SnapshotColumn::new("PUBLIC", "ORDERS", "STATUS", "TEXT", 2),
                SnapshotColumn::new("PUBLIC", "INVOICES", "ID", "NUMBER", 1),
            ],
        );

        assert_eq!(DriftReport::between(&base, &new), sample_report());
    }

    #[test]
    fn changes_are_classified() {
        let changes = sample_report().changes();
        let kinds: Vec<ChangeKind> = changes.iter().map(|c| c.kind).collect();

        assert_eq!(
            kinds,
            vec![
                ChangeKind::DriftColumnAdded,
                ChangeKind::DriftColumnAdded,
                ChangeKind::DriftColumnRemoved
            ]
        );
        assert_eq!(changes[0].key.to_string(), "PUBLIC.INVOICES.ID");
    }

    #[test]
    fn rendering_is_sorted_and_stable() {
        let report = sample_report();

        assert_eq!(report.render_added(), "- PUBLIC.INVOICES.ID\n- PUBLIC.ORDERS.STATUS");
        assert_eq!(report.render_removed(), "- PUBLIC.ORDERS.LEGACY_FLAG");
        assert_eq!(report.render_added(), report.clone().render_added());
    }

    #[test]
    fn summary_counts_tables() {
        let summary = sample_report().summary();
        assert_eq!(summary.added, 2);
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.tables_affected, 2);
    }

    #[test]
    fn groups_by_table_with_status() {
        let base: BTreeSet<TableRef> = [TableRef::new("PUBLIC", "ORDERS")].into_iter().collect();
        let new: BTreeSet<TableRef> = [
            TableRef::new("PUBLIC", "ORDERS"),
            TableRef::new("PUBLIC", "INVOICES"),
        ]
        .into_iter()
        .collect();

        let tables = sample_report().by_table(&base, &new);

        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].table, "INVOICES");
        assert_eq!(tables[0].status, TableStatus::New);
        assert_eq!(tables[0].added, vec!["ID"]);
        assert_eq!(tables[1].table, "ORDERS");
        assert_eq!(tables[1].status, TableStatus::Modified);
        assert_eq!(tables[1].added, vec!["STATUS"]);
        assert_eq!(tables[1].removed, vec!["LEGACY_FLAG"]);
    }

    #[test]
    fn report_serialization() {
        let json = serde_json::to_string(&sample_report()).unwrap();
        assert!(json.contains("\"base_date\":\"2024-05-01\""));
        assert!(json.contains("LEGACY_FLAG"));
    }
}
