//! Storage abstractions for record persistence.
//!
//! Three independent key-value namespaces, consistency enforced by the
//! pipeline rather than the store:
//!
//! - Primary: `id` → current [`Record`] state, upsert/find/list
//! - Snapshot: `id` → opaque page payload, upsert-only, no history
//! - Changelog: append-only log of [`ChangeEvent`]s, the audit trail
//!
//! Backends only need per-key read-your-writes consistency; the pipeline
//! serializes concurrent work on the same id itself.

pub mod local;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{ChangeEvent, Record};

// Re-export for convenience
pub use local::LocalStore;
pub use memory::{MemoryChangelog, MemoryRecordStore, MemorySnapshotStore};

/// Primary store: current record state keyed by id.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Replace the full document keyed by its id, creating it if absent.
    async fn upsert(&self, record: &Record) -> Result<()>;

    /// Current document for an id, or `None` if never stored.
    async fn find(&self, id: &str) -> Result<Option<Record>>;

    /// All stored records, unordered.
    async fn list(&self) -> Result<Vec<Record>>;
}

/// Snapshot store: latest opaque payload keyed by id. No history.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn upsert(&self, id: &str, payload: &[u8]) -> Result<()>;

    async fn find(&self, id: &str) -> Result<Option<Vec<u8>>>;
}

/// Append-only changelog of record change events.
#[async_trait]
pub trait ChangelogStore: Send + Sync {
    /// Insert events as new entries. Never updates or deletes existing
    /// ones; duplicates from crash-and-retry are accepted.
    async fn append(&self, events: &[ChangeEvent]) -> Result<()>;

    /// Events detected within `[from, to)`, ordered by detection time.
    async fn events_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ChangeEvent>>;
}
