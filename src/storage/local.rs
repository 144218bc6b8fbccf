//! Local filesystem storage backend.
//!
//! JSON-on-disk implementation of the three store namespaces, for
//! development and single-host deployments.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── records/
//! │   └── <id>.json         # Primary: current record state
//! ├── snapshots/
//! │   └── <id>.bin          # Snapshot: latest opaque payload
//! └── changelog.ndjson      # Changelog: one event per line, append-only
//! ```
//!
//! Record and snapshot writes are atomic (write to temp, then rename),
//! so a crashed write never leaves a torn document behind.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{ChangeEvent, Record};
use crate::storage::{ChangelogStore, RecordStore, SnapshotStore};

/// Local filesystem backend implementing all three store traits.
#[derive(Clone)]
pub struct LocalStore {
    root_dir: PathBuf,
    // Serializes changelog file appends so lines never interleave
    append_lock: Arc<Mutex<()>>,
}

impl LocalStore {
    /// Create a new LocalStore rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            append_lock: Arc::new(Mutex::new(())),
        }
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.root_dir.join("records").join(format!("{id}.json"))
    }

    fn snapshot_path(&self, id: &str) -> PathBuf {
        self.root_dir.join("snapshots").join(format!("{id}.bin"))
    }

    fn changelog_path(&self) -> PathBuf {
        self.root_dir.join("changelog.ndjson")
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: PathBuf, bytes: &[u8]) -> Result<()> {
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Read bytes, returning None if the file doesn't exist.
    async fn read_bytes(&self, path: PathBuf) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl RecordStore for LocalStore {
    async fn upsert(&self, record: &Record) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(record)?;
        self.write_bytes(self.record_path(&record.id), &bytes).await
    }

    async fn find(&self, id: &str) -> Result<Option<Record>> {
        match self.read_bytes(self.record_path(id)).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Record>> {
        let dir = self.root_dir.join("records");
        let mut records = Vec::new();

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(records),
            Err(e) => return Err(AppError::Io(e)),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = tokio::fs::read(&path).await?;
            records.push(serde_json::from_slice(&bytes)?);
        }
        Ok(records)
    }
}

#[async_trait]
impl SnapshotStore for LocalStore {
    async fn upsert(&self, id: &str, payload: &[u8]) -> Result<()> {
        self.write_bytes(self.snapshot_path(id), payload).await
    }

    async fn find(&self, id: &str) -> Result<Option<Vec<u8>>> {
        self.read_bytes(self.snapshot_path(id)).await
    }
}

#[async_trait]
impl ChangelogStore for LocalStore {
    async fn append(&self, events: &[ChangeEvent]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        let mut buffer = Vec::new();
        for event in events {
            serde_json::to_writer(&mut buffer, event)?;
            buffer.push(b'\n');
        }

        let path = self.changelog_path();
        self.ensure_dir(&path).await?;

        let _guard = self.append_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(&buffer).await?;
        file.flush().await?;
        Ok(())
    }

    async fn events_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ChangeEvent>> {
        let bytes = match self.read_bytes(self.changelog_path()).await? {
            Some(bytes) => bytes,
            None => return Ok(Vec::new()),
        };

        let mut events = Vec::new();
        for line in bytes.split(|b| *b == b'\n') {
            if line.is_empty() {
                continue;
            }
            let event: ChangeEvent = serde_json::from_slice(line)?;
            if event.detected_at >= from && event.detected_at < to {
                events.push(event);
            }
        }
        events.sort_by_key(|e| e.detected_at);
        Ok(events)
    }
}
