//! Drift report file (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use crate::change::Change;
use crate::changelog::Narrative;
use crate::drift::{DriftReport, DriftSummary, TableDrift};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Drift report (drift-report.json v1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Base snapshot date
    pub base_date: NaiveDate,

    /// New snapshot date
    pub new_date: NaiveDate,

    /// Summary statistics
    pub summary: DriftSummary,

    /// All classified changes
    pub changes: Vec<Change>,

    /// Changes grouped per table
    pub tables: Vec<TableDrift>,

    /// Narrative text, when one was produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

impl Report {
    /// Create a report file from a drift report
    pub fn from_drift(drift: &DriftReport, tables: Vec<TableDrift>) -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            base_date: drift.base_date,
            new_date: drift.new_date,
            summary: drift.summary(),
            changes: drift.changes(),
            tables,
            narrative: None,
        }
    }

    /// Attach a narrative (unavailable narratives are left out)
    pub fn with_narrative(mut self, narrative: &Narrative) -> Self {
        self.narrative = narrative.text().map(str::to_string);
        self
    }

    /// Check if the report has any drift
    pub fn has_drift(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}
