//! File-backed stores
//!
//! Snapshots live one per file as `<dir>/<YYYY-MM-DD>.json`. Each file is
//! written to a temporary sibling and then moved into place, so a reader
//! never sees half a snapshot. The change log is a JSON-lines file that is
//! only ever appended to. A line torn by a crash mid-append is closed off by
//! the next append and skipped on read.

use crate::changelog::{ChangeLog, LogError};
use crate::snapshot_store::{SnapshotStore, StoreError};
use chrono::NaiveDate;
use schemadrift_core::{ChangeLogEntry, Snapshot};
use std::io::{self, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

/// Snapshot store rooted at a directory
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store rooted at `dir`; the directory is created on first save
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the snapshot files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the snapshot for `date`
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.json", date.format("%Y-%m-%d")))
    }

    async fn write(&self, snapshot: &Snapshot, overwrite: bool) -> Result<(), StoreError> {
        let date = snapshot.date();
        let json = snapshot
            .to_json()
            .map_err(|cause| StoreError::Corrupt { date, cause })?;

        tokio::fs::create_dir_all(&self.dir).await?;

        let dir = self.dir.clone();
        let target = self.path_for(date);
        let result = tokio::task::spawn_blocking(move || persist(&dir, &target, json.as_bytes(), overwrite))
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        match result {
            Ok(()) => {
                tracing::debug!(%date, overwrite, "wrote snapshot file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(StoreError::DuplicateDate(date)),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

/// Write `bytes` to a temporary file in `dir`, then move it onto `target`
fn persist(dir: &Path, target: &Path, bytes: &[u8], overwrite: bool) -> io::Result<()> {
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;

    if overwrite {
        temp.persist(target).map_err(|e| e.error)?;
    } else {
        temp.persist_noclobber(target).map_err(|e| e.error)?;
    }
    Ok(())
}

#[async_trait::async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        self.write(snapshot, false).await
    }

    async fn replace(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        self.write(snapshot, true).await
    }

    async fn load(&self, date: NaiveDate) -> Result<Snapshot, StoreError> {
        let json = match tokio::fs::read_to_string(self.path_for(date)).await {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(StoreError::NotFound(date)),
            Err(e) => return Err(StoreError::Io(e)),
        };

        Snapshot::from_json(date, &json).map_err(|cause| StoreError::Corrupt { date, cause })
    }

    async fn dates(&self) -> Result<Vec<NaiveDate>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };

        let mut dates = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
            match parsed {
                Some(date) => dates.push(date),
                None => tracing::debug!(path = %path.display(), "ignoring non-snapshot file"),
            }
        }

        dates.sort();
        Ok(dates)
    }
}

/// Change log stored as one JSON object per line
#[derive(Debug, Clone)]
pub struct JsonLinesChangeLog {
    path: PathBuf,
}

impl JsonLinesChangeLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl ChangeLog for JsonLinesChangeLog {
    async fn append(&self, entry: &ChangeLogEntry) -> Result<(), LogError> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .await?;

        if ends_mid_line(&mut file).await? {
            tracing::warn!(path = %self.path.display(), "closing off a torn change log line");
            line.insert(0, '\n');
        }

        // One write per entry keeps lines whole under O_APPEND
        file.write_all(line.as_bytes()).await?;
        file.sync_data().await?;

        tracing::debug!(path = %self.path.display(), changes_date = %entry.changes_date, "appended change log entry");
        Ok(())
    }

    async fn entries(&self) -> Result<Vec<ChangeLogEntry>, LogError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(LogError::Write(e)),
        };

        let mut entries = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    line = index + 1,
                    error = %e,
                    "skipping unreadable change log line"
                ),
            }
        }
        Ok(entries)
    }
}

/// Whether the last byte of a non-empty file is something other than `\n`
async fn ends_mid_line(file: &mut tokio::fs::File) -> io::Result<bool> {
    if file.metadata().await?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1)).await?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last).await?;
    Ok(last[0] != b'\n')
}
