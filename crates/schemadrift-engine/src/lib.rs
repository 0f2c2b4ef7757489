//! SchemaDrift engine - drift detection logic
//!
//! This crate implements the core logic of SchemaDrift:
//! - Snapshot diff engine
//! - Change logging
//! - The capture/detect pipeline

pub mod diff;
pub mod logger;
pub mod pipeline;

pub use diff::DiffEngine;
pub use logger::{ChangeLogger, Clock};
pub use pipeline::{
    CaptureOutcome, DetectionOutcome, DriftPipeline, DuplicatePolicy, LogStatus, PipelineError,
    RunOutcome,
};
