//! Snapshot store trait

use chrono::NaiveDate;
use schemadrift_core::{Snapshot, SnapshotError};

/// Errors raised by snapshot stores
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("A snapshot for {0} already exists")]
    DuplicateDate(NaiveDate),

    #[error("No snapshot stored for {0}")]
    NotFound(NaiveDate),

    #[error("Missing snapshot(s) for {}; refusing to diff one-sided data", join_dates(.missing))]
    MissingSnapshot { missing: Vec<NaiveDate> },

    #[error("Stored snapshot for {date} is corrupt: {cause}")]
    Corrupt {
        date: NaiveDate,
        #[source]
        cause: SnapshotError,
    },

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_dates(dates: &[NaiveDate]) -> String {
    dates.iter().map(NaiveDate::to_string).collect::<Vec<_>>().join(", ")
}

/// Append-only store of dated snapshots
///
/// At most one snapshot exists per date. `save` never overwrites; callers
/// that really want to overwrite must say so with `replace`.
#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persist a snapshot; fails with `DuplicateDate` if its date is taken
    async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;

    /// Persist a snapshot, overwriting any snapshot stored for its date
    async fn replace(&self, snapshot: &Snapshot) -> Result<(), StoreError>;

    /// Load the snapshot for a date; fails with `NotFound` if absent
    async fn load(&self, date: NaiveDate) -> Result<Snapshot, StoreError>;

    /// Every stored date, ascending
    async fn dates(&self) -> Result<Vec<NaiveDate>, StoreError>;

    /// Load the two snapshots of a comparison
    ///
    /// Fails with `MissingSnapshot` naming every absent date; never returns
    /// one snapshot alone.
    async fn load_range(
        &self,
        base: NaiveDate,
        new: NaiveDate,
    ) -> Result<(Snapshot, Snapshot), StoreError> {
        let base_snapshot = load_optional(self.load(base).await)?;
        let new_snapshot = load_optional(self.load(new).await)?;

        match (base_snapshot, new_snapshot) {
            (Some(base_snapshot), Some(new_snapshot)) => Ok((base_snapshot, new_snapshot)),
            (base_snapshot, new_snapshot) => {
                let mut missing = Vec::new();
                if base_snapshot.is_none() {
                    missing.push(base);
                }
                if new_snapshot.is_none() && new != base {
                    missing.push(new);
                }
                Err(StoreError::MissingSnapshot { missing })
            }
        }
    }

    /// Latest stored date strictly before `before`
    async fn previous_date(&self, before: NaiveDate) -> Result<Option<NaiveDate>, StoreError> {
        Ok(self.dates().await?.into_iter().filter(|d| *d < before).max())
    }
}

/// Turn `NotFound` into `None`, keep every other error
fn load_optional(result: Result<Snapshot, StoreError>) -> Result<Option<Snapshot>, StoreError> {
    match result {
        Ok(snapshot) => Ok(Some(snapshot)),
        Err(StoreError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_snapshot_message_lists_dates() {
        let err = StoreError::MissingSnapshot {
            missing: vec!["2024-05-01".parse().unwrap(), "2024-05-02".parse().unwrap()],
        };
        assert_eq!(
            err.to_string(),
            "Missing snapshot(s) for 2024-05-01, 2024-05-02; refusing to diff one-sided data"
        );
    }
}
