//! SchemaDrift Core
//!
//! Core domain model with stable, versioned types.
//! The snapshot JSON shape and change codes are part of the persisted format -
//! never rename their fields.

pub mod schema;
pub mod snapshot;
pub mod change;
pub mod drift;
pub mod changelog;
pub mod report;
pub mod config;

pub use schema::{ColumnKey, ColumnMetadata, SnapshotColumn, TableRef};
pub use snapshot::{Snapshot, SnapshotError};
pub use change::{Change, ChangeKind};
pub use drift::{DriftReport, DriftSummary, TableDrift, TableStatus, render_list};
pub use changelog::{ChangeLogEntry, Narrative, EMPTY_NARRATIVE_REASON, NARRATIVE_UNAVAILABLE};
pub use report::{Report, ReportVersion};
pub use config::{Config, ConfigError, SourceConfig, CaptureConfig, StoreConfig, NarrativeConfig};
