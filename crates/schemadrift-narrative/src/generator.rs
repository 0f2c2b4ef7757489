//! Narrative generator trait and the time-bounded wrapper around it

use schemadrift_core::{DriftReport, Narrative};
use std::sync::Arc;
use std::time::Duration;

/// Reason recorded when no generator is configured
pub const DISABLED_REASON: &str = "narrative generation disabled";

/// Errors from a narrative service
///
/// None of these abort a run; they degrade the narrative to unavailable.
#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("Narrative request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Narrative HTTP request failed: {0}")]
    Http(String),

    #[error("Narrative service error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid narrative response: {0}")]
    InvalidResponse(String),

    #[error("Narrative configuration error: {0}")]
    Config(String),

    #[error("Failed to render narrative prompt: {0}")]
    Prompt(#[from] minijinja::Error),
}

/// Produces a human-readable explanation of a drift report
#[async_trait::async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// Generator name for logs
    fn name(&self) -> &'static str;

    /// Explain a non-empty drift report
    async fn explain(&self, report: &DriftReport) -> Result<String, NarrativeError>;
}

/// Runs a generator under a deadline and never fails
///
/// Timeouts and generator errors become [`Narrative::Unavailable`]; a
/// narrator without a generator always returns unavailable.
#[derive(Clone)]
pub struct TimeBoundNarrator {
    generator: Option<Arc<dyn NarrativeGenerator>>,
    timeout: Duration,
    disabled_reason: String,
}

impl TimeBoundNarrator {
    /// Bound `generator` by `timeout`
    pub fn new(generator: Arc<dyn NarrativeGenerator>, timeout: Duration) -> Self {
        Self {
            generator: Some(generator),
            timeout,
            disabled_reason: DISABLED_REASON.to_string(),
        }
    }

    /// A narrator that never calls out
    pub fn disabled() -> Self {
        Self::disabled_because(DISABLED_REASON)
    }

    /// A narrator that never calls out, with a specific reason
    pub fn disabled_because(reason: impl Into<String>) -> Self {
        Self {
            generator: None,
            timeout: Duration::ZERO,
            disabled_reason: reason.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.generator.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Explain `report`, waiting at most the configured timeout
    pub async fn narrate(&self, report: &DriftReport) -> Narrative {
        let Some(generator) = &self.generator else {
            return Narrative::unavailable(self.disabled_reason.clone());
        };

        let result = match tokio::time::timeout(self.timeout, generator.explain(report)).await {
            Ok(result) => result,
            Err(_) => Err(NarrativeError::Timeout(self.timeout)),
        };

        match result {
            Ok(text) => {
                tracing::debug!(generator = generator.name(), chars = text.len(), "narrative generated");
                Narrative::generated(text)
            }
            Err(e) => {
                tracing::warn!(generator = generator.name(), error = %e, "narrative unavailable");
                Narrative::unavailable(e.to_string())
            }
        }
    }
}

impl std::fmt::Debug for TimeBoundNarrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeBoundNarrator")
            .field("generator", &self.generator.as_ref().map(|g| g.name()))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockNarrator;
    use schemadrift_core::ColumnKey;

    fn report() -> DriftReport {
        DriftReport::from_key_sets(
            "2024-05-01".parse().unwrap(),
            "2024-05-02".parse().unwrap(),
            &Default::default(),
            &[ColumnKey::new("PUBLIC", "ORDERS", "STATUS")].into_iter().collect(),
        )
    }

    #[tokio::test]
    async fn disabled_narrator_is_unavailable() {
        let narrative = TimeBoundNarrator::disabled().narrate(&report()).await;
        assert_eq!(narrative, Narrative::unavailable(DISABLED_REASON));
    }

    #[tokio::test]
    async fn generator_text_passes_through() {
        let narrator = TimeBoundNarrator::new(
            Arc::new(MockNarrator::with_text("Orders gained a status column.")),
            Duration::from_secs(1),
        );
        let narrative = narrator.narrate(&report()).await;
        assert_eq!(narrative.text(), Some("Orders gained a status column."));
    }

    #[tokio::test]
    async fn sentinel_reply_is_unavailable() {
        let narrator = TimeBoundNarrator::new(
            Arc::new(MockNarrator::with_text("unavailable")),
            Duration::from_secs(1),
        );
        let narrative = narrator.narrate(&report()).await;

        assert!(!narrative.is_available());
        assert_eq!(narrative, Narrative::unavailable(schemadrift_core::EMPTY_NARRATIVE_REASON));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_generator_times_out() {
        let narrator = TimeBoundNarrator::new(
            Arc::new(MockNarrator::with_text("late").with_latency(Duration::from_secs(60))),
            Duration::from_secs(30),
        );
        let narrative = narrator.narrate(&report()).await;

        assert!(!narrative.is_available());
        assert!(narrative.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn generator_error_is_unavailable() {
        let narrator = TimeBoundNarrator::new(
            Arc::new(MockNarrator::failing("connection refused")),
            Duration::from_secs(1),
        );
        let narrative = narrator.narrate(&report()).await;
        assert_eq!(narrative.as_log_text(), "unavailable");
    }
}
