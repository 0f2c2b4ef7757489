//! Mock narrative generator for testing

use crate::generator::{NarrativeError, NarrativeGenerator};
use schemadrift_core::DriftReport;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Narrative generator returning canned text
#[derive(Clone, Default)]
pub struct MockNarrator {
    text: String,
    failure: Option<String>,
    latency: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl MockNarrator {
    /// Always answer with `text`
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Always fail with an HTTP error carrying `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Sleep before answering
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of `explain` calls so far, across clones
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl NarrativeGenerator for MockNarrator {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn explain(&self, _report: &DriftReport) -> Result<String, NarrativeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match &self.failure {
            Some(message) => Err(NarrativeError::Http(message.clone())),
            None => Ok(self.text.clone()),
        }
    }
}
