//! In-memory storage backends.
//!
//! Used by tests and by embedded runs that do not need persistence.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::{ChangeEvent, Record};
use crate::storage::{ChangelogStore, RecordStore, SnapshotStore};

/// In-memory primary store.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<String, Record>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn upsert(&self, record: &Record) -> Result<()> {
        self.records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Option<Record>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Record>> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}

/// In-memory snapshot store.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn upsert(&self, id: &str, payload: &[u8]) -> Result<()> {
        self.snapshots
            .write()
            .await
            .insert(id.to_string(), payload.to_vec());
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.snapshots.read().await.get(id).cloned())
    }
}

/// In-memory append-only changelog.
#[derive(Debug, Default)]
pub struct MemoryChangelog {
    events: RwLock<Vec<ChangeEvent>>,
}

impl MemoryChangelog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event ever appended, in append order. Test helper.
    pub async fn all(&self) -> Vec<ChangeEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl ChangelogStore for MemoryChangelog {
    async fn append(&self, events: &[ChangeEvent]) -> Result<()> {
        self.events.write().await.extend_from_slice(events);
        Ok(())
    }

    async fn events_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ChangeEvent>> {
        let mut matched: Vec<ChangeEvent> = self
            .events
            .read()
            .await
            .iter()
            .filter(|e| e.detected_at >= from && e.detected_at < to)
            .cloned()
            .collect();
        matched.sort_by_key(|e| e.detected_at);
        Ok(matched)
    }
}
