//! Change logger: the audit trail of drift events

use chrono::NaiveDate;
use schemadrift_core::{ChangeLogEntry, DriftReport, Narrative};
use schemadrift_store::{ChangeLog, LogError};
use std::sync::Arc;

/// Source of the date stamped on new entries
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Records drift reports into a change log
pub struct ChangeLogger {
    log: Arc<dyn ChangeLog>,
    clock: Clock,
}

impl ChangeLogger {
    /// Create a logger stamping entries with the local current date
    pub fn new(log: Arc<dyn ChangeLog>) -> Self {
        Self::with_clock(log, Arc::new(|| chrono::Local::now().date_naive()))
    }

    /// Create a logger with an explicit clock
    pub fn with_clock(log: Arc<dyn ChangeLog>, clock: Clock) -> Self {
        Self { log, clock }
    }

    /// Append one entry for `report`
    ///
    /// Refuses reports without drift; only actual drift is logged.
    pub async fn record(
        &self,
        report: &DriftReport,
        narrative: &Narrative,
    ) -> Result<ChangeLogEntry, LogError> {
        if report.is_empty() {
            return Err(LogError::NoDrift {
                base_date: report.base_date,
                new_date: report.new_date,
            });
        }

        let entry = ChangeLogEntry::new((self.clock)(), report, narrative);
        self.log.append(&entry).await?;

        tracing::info!(
            base_date = %entry.base_date,
            new_date = %entry.new_date,
            narrative = entry.has_narrative(),
            "recorded drift event"
        );
        Ok(entry)
    }

    /// Every recorded entry, oldest first
    pub async fn history(&self) -> Result<Vec<ChangeLogEntry>, LogError> {
        self.log.entries().await
    }
}
