//! Drift narratives
//!
//! A [`NarrativeGenerator`] turns a drift report into prose. Callers go
//! through [`TimeBoundNarrator`], which bounds the call and degrades any
//! failure to [`schemadrift_core::Narrative::Unavailable`].

pub mod generator;
pub mod mock;
pub mod openai;
pub mod prompt;

pub use generator::{NarrativeError, NarrativeGenerator, TimeBoundNarrator, DISABLED_REASON};
pub use mock::MockNarrator;
pub use openai::OpenAiNarrator;
pub use prompt::PromptRenderer;

use schemadrift_core::NarrativeConfig;
use std::sync::Arc;

/// Build the narrator described by the `[narrative]` table
///
/// A disabled section, or one that cannot produce a working client, yields a
/// narrator that always reports the narrative as unavailable.
pub fn narrator_from_config(config: &NarrativeConfig) -> TimeBoundNarrator {
    if !config.enabled {
        return TimeBoundNarrator::disabled();
    }

    match OpenAiNarrator::new(config) {
        Ok(narrator) => TimeBoundNarrator::new(Arc::new(narrator), config.timeout()),
        Err(e) => {
            tracing::warn!(error = %e, "narrative generation unavailable");
            TimeBoundNarrator::disabled_because(e.to_string())
        }
    }
}
