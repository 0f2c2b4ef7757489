//! Change log entries and narratives

use crate::drift::DriftReport;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Text persisted in place of a narrative that could not be produced
pub const NARRATIVE_UNAVAILABLE: &str = "unavailable";

/// Reason given when the service answered with nothing usable
pub const EMPTY_NARRATIVE_REASON: &str = "narrative service returned no usable text";

/// Explanation attached to a drift report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Narrative {
    /// Text returned by the narrative service
    Generated(String),

    /// No text could be produced (timeout, service error, disabled)
    Unavailable {
        /// Why the narrative is missing, for logs and operators
        reason: String,
    },
}

impl Narrative {
    /// Wrap service output
    ///
    /// Blank text and text equal to [`NARRATIVE_UNAVAILABLE`] become
    /// unavailable, so the log sentinel only ever marks a missing narrative.
    pub fn generated(text: impl Into<String>) -> Self {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NARRATIVE_UNAVAILABLE) {
            return Self::unavailable(EMPTY_NARRATIVE_REASON);
        }
        Self::Generated(text)
    }

    /// Create an unavailable narrative
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Whether text was produced
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Generated(_))
    }

    /// Generated text, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Generated(text) => Some(text),
            Self::Unavailable { .. } => None,
        }
    }

    /// Text as written to the change log
    pub fn as_log_text(&self) -> &str {
        match self {
            Self::Generated(text) => text,
            Self::Unavailable { .. } => NARRATIVE_UNAVAILABLE,
        }
    }
}

impl std::fmt::Display for Narrative {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generated(text) => write!(f, "{}", text),
            Self::Unavailable { reason } => write!(f, "narrative unavailable ({})", reason),
        }
    }
}

/// Audit record of one drift event
///
/// The serialized field names match the `changes_logs` row:
/// `changesDate`, `baseDate`, `newDate`, `gptExplanation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLogEntry {
    /// When the entry was recorded
    pub changes_date: NaiveDate,

    /// Base snapshot date of the report
    pub base_date: NaiveDate,

    /// New snapshot date of the report
    pub new_date: NaiveDate,

    /// Narrative text, or [`NARRATIVE_UNAVAILABLE`]
    #[serde(rename = "gptExplanation")]
    pub narrative: String,
}

impl ChangeLogEntry {
    /// Build an entry for a report
    pub fn new(changes_date: NaiveDate, report: &DriftReport, narrative: &Narrative) -> Self {
        Self {
            changes_date,
            base_date: report.base_date,
            new_date: report.new_date,
            narrative: narrative.as_log_text().to_string(),
        }
    }

    /// Whether the entry carries a real narrative
    ///
    /// Relies on [`Narrative::generated`] never producing the sentinel as
    /// text. Entries written by other tools may still hold it verbatim.
    pub fn has_narrative(&self) -> bool {
        self.narrative.trim() != NARRATIVE_UNAVAILABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn unavailable_narrative_uses_sentinel() {
        let narrative = Narrative::unavailable("timed out after 30s");
        assert!(!narrative.is_available());
        assert_eq!(narrative.text(), None);
        assert_eq!(narrative.as_log_text(), "unavailable");
        assert!(narrative.to_string().contains("timed out"));
    }

    #[test]
    fn sentinel_text_from_the_service_is_not_a_narrative() {
        for text in ["unavailable", "  Unavailable\n", "", "   "] {
            let narrative = Narrative::generated(text);
            assert_eq!(narrative, Narrative::unavailable(EMPTY_NARRATIVE_REASON));

            let report = DriftReport::no_drift(date("2024-05-01"), date("2024-05-02"));
            let entry = ChangeLogEntry::new(date("2024-05-02"), &report, &narrative);
            assert!(!entry.has_narrative());
        }

        let narrative = Narrative::generated("The column is unavailable upstream.");
        assert_eq!(narrative.text(), Some("The column is unavailable upstream."));
    }

    #[test]
    fn entry_copies_report_dates() {
        let report = DriftReport::no_drift(date("2024-05-01"), date("2024-05-02"));
        let entry = ChangeLogEntry::new(
            date("2024-05-02"),
            &report,
            &Narrative::Generated("ORDERS gained STATUS".to_string()),
        );

        assert_eq!(entry.base_date, date("2024-05-01"));
        assert_eq!(entry.new_date, date("2024-05-02"));
        assert!(entry.has_narrative());
    }

    #[test]
    fn entry_wire_format() {
        let report = DriftReport::no_drift(date("2024-05-01"), date("2024-05-02"));
        let entry = ChangeLogEntry::new(date("2024-05-02"), &report, &Narrative::unavailable("disabled"));
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "changesDate": "2024-05-02",
                "baseDate": "2024-05-01",
                "newDate": "2024-05-02",
                "gptExplanation": "unavailable"
            })
        );
    }
}
