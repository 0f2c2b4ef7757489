//! Snapshot and change log persistence
//!
//! Snapshots are append-only and keyed by date; the change log is an
//! append-only audit trail of drift events. Both come with an in-memory
//! implementation for tests and a file-backed one for real use.

pub mod changelog;
pub mod fs;
pub mod memory;
pub mod snapshot_store;

pub use changelog::{ChangeLog, LogError};
pub use fs::{FileSnapshotStore, JsonLinesChangeLog};
pub use memory::{InMemoryChangeLog, InMemorySnapshotStore};
pub use snapshot_store::{SnapshotStore, StoreError};
