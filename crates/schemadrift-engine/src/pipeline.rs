//! Drift pipeline: capture, compare, explain, record

use crate::diff::DiffEngine;
use crate::logger::ChangeLogger;
use chrono::NaiveDate;
use schemadrift_catalog::{CaptureError, SchemaCapturer};
use schemadrift_core::{ChangeLogEntry, DriftReport, Narrative, Report, Snapshot, TableDrift};
use schemadrift_narrative::TimeBoundNarrator;
use schemadrift_store::{SnapshotStore, StoreError};
use std::sync::Arc;

/// Errors that abort a pipeline step
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Nothing to compare: {0}")]
    NothingToCompare(String),

    #[error("No metadata source configured; add a [source] section to schemadrift.toml")]
    NoSource,
}

/// What to do when a snapshot already exists for the capture date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Fail with `DuplicateDate`
    #[default]
    Reject,
    /// Keep the stored snapshot
    Skip,
    /// Overwrite the stored snapshot
    Replace,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "skip" => Ok(Self::Skip),
            "replace" => Ok(Self::Replace),
            other => Err(format!("unknown duplicate policy '{}' (expected reject, skip or replace)", other)),
        }
    }
}

/// Result of a capture step
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// Snapshot stored under a fresh date
    Saved(Snapshot),

    /// Snapshot overwrote the one stored for its date
    Replaced(Snapshot),

    /// A snapshot already existed and was kept
    Skipped {
        date: NaiveDate,
        /// Whether the new capture equals the stored one
        matches_stored: bool,
    },
}

impl CaptureOutcome {
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Saved(snapshot) | Self::Replaced(snapshot) => snapshot.date(),
            Self::Skipped { date, .. } => *date,
        }
    }
}

/// Whether a drift event made it into the change log
#[derive(Debug, Clone, PartialEq)]
pub enum LogStatus {
    Recorded(ChangeLogEntry),
    Failed(String),
}

impl LogStatus {
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded(_))
    }
}

/// Result of a detection step
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionOutcome {
    /// The two snapshots hold the same columns; nothing was logged
    NoDrift {
        base_date: NaiveDate,
        new_date: NaiveDate,
    },

    /// Columns were added or removed
    ///
    /// The report survives even when the narrative or the log write failed.
    Drift {
        report: DriftReport,
        tables: Vec<TableDrift>,
        narrative: Narrative,
        log: LogStatus,
    },
}

impl DetectionOutcome {
    pub fn has_drift(&self) -> bool {
        matches!(self, Self::Drift { .. })
    }

    /// The drift report, if any
    pub fn report(&self) -> Option<&DriftReport> {
        match self {
            Self::Drift { report, .. } => Some(report),
            Self::NoDrift { .. } => None,
        }
    }

    /// Build the drift-report.json document
    pub fn to_report_file(&self) -> Report {
        match self {
            Self::Drift { report, tables, narrative, .. } => {
                Report::from_drift(report, tables.clone()).with_narrative(narrative)
            }
            Self::NoDrift { base_date, new_date } => {
                Report::from_drift(&DriftReport::no_drift(*base_date, *new_date), Vec::new())
            }
        }
    }
}

/// Result of a daily run
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub capture: CaptureOutcome,
    pub detection: DetectionOutcome,
}

/// Orchestrates one pass of drift detection
///
/// Every collaborator is passed in; the pipeline holds no global state.
/// Detection works on stored snapshots alone, so the capturer is optional.
pub struct DriftPipeline {
    capturer: Option<SchemaCapturer>,
    store: Arc<dyn SnapshotStore>,
    narrator: TimeBoundNarrator,
    logger: ChangeLogger,
}

impl DriftPipeline {
    pub fn new(store: Arc<dyn SnapshotStore>, narrator: TimeBoundNarrator, logger: ChangeLogger) -> Self {
        Self {
            capturer: None,
            store,
            narrator,
            logger,
        }
    }

    /// Attach the capturer used by `capture` and `run`
    pub fn with_capturer(mut self, capturer: SchemaCapturer) -> Self {
        self.capturer = Some(capturer);
        self
    }

    pub fn store(&self) -> &Arc<dyn SnapshotStore> {
        &self.store
    }

    pub fn logger(&self) -> &ChangeLogger {
        &self.logger
    }

    /// Capture the warehouse and store the snapshot under `date`
    pub async fn capture(
        &self,
        date: NaiveDate,
        policy: DuplicatePolicy,
    ) -> Result<CaptureOutcome, PipelineError> {
        let capturer = self.capturer.as_ref().ok_or(PipelineError::NoSource)?;
        let snapshot = capturer.capture(date).await?;

        match self.store.save(&snapshot).await {
            Ok(()) => {
                tracing::info!(%date, columns = snapshot.len(), "stored snapshot");
                Ok(CaptureOutcome::Saved(snapshot))
            }
            Err(StoreError::DuplicateDate(_)) => match policy {
                DuplicatePolicy::Reject => Err(StoreError::DuplicateDate(date).into()),
                DuplicatePolicy::Skip => {
                    let stored = self.store.load(date).await?;
                    let matches_stored = stored.fingerprint() == snapshot.fingerprint();
                    tracing::warn!(%date, matches_stored, "snapshot already stored; keeping it");
                    Ok(CaptureOutcome::Skipped { date, matches_stored })
                }
                DuplicatePolicy::Replace => {
                    self.store.replace(&snapshot).await?;
                    tracing::warn!(%date, columns = snapshot.len(), "replaced stored snapshot");
                    Ok(CaptureOutcome::Replaced(snapshot))
                }
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Compare the snapshots stored for `base` and `new`
    ///
    /// Both snapshots must exist. Only drift is explained and logged.
    pub async fn detect(
        &self,
        base: NaiveDate,
        new: NaiveDate,
    ) -> Result<DetectionOutcome, PipelineError> {
        let (base_snapshot, new_snapshot) = self.store.load_range(base, new).await?;
        let report = DiffEngine::diff(&base_snapshot, &new_snapshot);

        if report.is_empty() {
            tracing::info!(base_date = %base, new_date = %new, "no drift detected");
            return Ok(DetectionOutcome::NoDrift {
                base_date: base,
                new_date: new,
            });
        }

        let summary = report.summary();
        tracing::info!(
            base_date = %base,
            new_date = %new,
            added = summary.added,
            removed = summary.removed,
            tables = summary.tables_affected,
            "schema drift detected"
        );

        let tables = DiffEngine::tables(&report, &base_snapshot, &new_snapshot);
        let narrative = self.narrator.narrate(&report).await;

        let log = match self.logger.record(&report, &narrative).await {
            Ok(entry) => LogStatus::Recorded(entry),
            Err(e) => {
                tracing::warn!(error = %e, "failed to record drift event");
                LogStatus::Failed(e.to_string())
            }
        };

        Ok(DetectionOutcome::Drift {
            report,
            tables,
            narrative,
            log,
        })
    }

    /// Capture `today`, then compare it with the day before
    pub async fn run(
        &self,
        today: NaiveDate,
        policy: DuplicatePolicy,
    ) -> Result<RunOutcome, PipelineError> {
        let yesterday = today
            .pred_opt()
            .ok_or_else(|| PipelineError::NothingToCompare(format!("no day before {}", today)))?;

        let capture = self.capture(today, policy).await?;
        let detection = self.detect(yesterday, today).await?;

        Ok(RunOutcome { capture, detection })
    }

    /// Fill in the dates of a comparison
    ///
    /// `new` defaults to the latest stored date and `base` to the stored
    /// date right before `new`.
    pub async fn resolve_dates(
        &self,
        base: Option<NaiveDate>,
        new: Option<NaiveDate>,
    ) -> Result<(NaiveDate, NaiveDate), PipelineError> {
        let new = match new {
            Some(new) => new,
            None => self
                .store
                .dates()
                .await?
                .last()
                .copied()
                .ok_or_else(|| PipelineError::NothingToCompare("no snapshots stored".to_string()))?,
        };

        let base = match base {
            Some(base) => base,
            None => self.store.previous_date(new).await?.ok_or_else(|| {
                PipelineError::NothingToCompare(format!("no snapshot stored before {}", new))
            })?,
        };

        Ok((base, new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_policy_parses_case_insensitively() {
        assert_eq!("Skip".parse::<DuplicatePolicy>().unwrap(), DuplicatePolicy::Skip);
        assert_eq!("replace".parse::<DuplicatePolicy>().unwrap(), DuplicatePolicy::Replace);
        assert!("overwrite".parse::<DuplicatePolicy>().is_err());
    }
}
