//! Diff engine for comparing two schema snapshots
//!
//! Only column identity is compared. A column whose type or position changed
//! but whose `(schema, table, column)` key survived is not drift.

use schemadrift_core::{DriftReport, Snapshot, TableDrift};

/// Compares snapshots
pub struct DiffEngine;

impl DiffEngine {
    /// Compare `base` against `new`
    ///
    /// `added` holds keys only in `new`, `removed` holds keys only in
    /// `base`. The two sets are disjoint and sorted.
    pub fn diff(base: &Snapshot, new: &Snapshot) -> DriftReport {
        let report = DriftReport::between(base, new);
        tracing::debug!(
            base_date = %report.base_date,
            new_date = %report.new_date,
            added = report.added().len(),
            removed = report.removed().len(),
            "diffed snapshots"
        );
        report
    }

    /// Group a report per table, classifying each table against both snapshots
    pub fn tables(report: &DriftReport, base: &Snapshot, new: &Snapshot) -> Vec<TableDrift> {
        report.by_table(&base.tables(), &new.tables())
    }
}
