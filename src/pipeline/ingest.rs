//! Pipeline coordinator.
//!
//! Sequences normalize → identify → diff → log → store → snapshot for
//! each incoming record, serializing concurrent work on the same record
//! id and retrying transient store failures with backoff.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::error::{AppError, Result};
use crate::models::{Config, Outcome, RawRecord, Record};
use crate::pipeline::diff::ChangeDetector;
use crate::pipeline::locks::KeyedLocks;
use crate::pipeline::normalize::{Normalized, Normalizer};
use crate::storage::{ChangelogStore, RecordStore, SnapshotStore};

/// Coordinates one ingestion at a time per record id.
///
/// Store handles are injected at construction and shared read-only; the
/// coordinator itself holds no other mutable state beyond the lock
/// registry and the concurrency limiter.
pub struct Ingestor {
    records: Arc<dyn RecordStore>,
    snapshots: Arc<dyn SnapshotStore>,
    changelog: Arc<dyn ChangelogStore>,
    normalizer: Normalizer,
    detector: ChangeDetector,
    locks: KeyedLocks,
    limiter: Arc<Semaphore>,
    max_attempts: u32,
    backoff: Duration,
}

impl Ingestor {
    pub fn new(
        config: &Config,
        records: Arc<dyn RecordStore>,
        snapshots: Arc<dyn SnapshotStore>,
        changelog: Arc<dyn ChangelogStore>,
    ) -> Self {
        Self {
            records,
            snapshots,
            changelog,
            normalizer: Normalizer::new(&config.tracking),
            detector: ChangeDetector::new(&config.tracking),
            locks: KeyedLocks::new(),
            limiter: Arc::new(Semaphore::new(config.pipeline.max_concurrent)),
            max_attempts: config.pipeline.max_attempts.max(1),
            backoff: Duration::from_millis(config.pipeline.retry_backoff_ms),
        }
    }

    /// Ingest one raw record end to end.
    ///
    /// Validation failures and invariant violations return immediately
    /// and are never retried. Transient store failures retry the guarded
    /// read-diff-write sequence with exponential backoff; a retry after a
    /// successful changelog append may duplicate events, which is the
    /// accepted cost of at-least-once delivery. The snapshot upsert is
    /// independent and best-effort: its failure never fails the record.
    pub async fn process(&self, raw: &RawRecord) -> Result<Outcome> {
        let _permit = self
            .limiter
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| AppError::store("pipeline limiter closed"))?;

        let Normalized { record, payload } = self.normalizer.normalize(raw)?;

        // Held through the primary-store write so that concurrent
        // ingestions of the same id read and apply changes sequentially.
        let _guard = self.locks.acquire(&record.id).await;

        let mut attempt = 1;
        let outcome = loop {
            match self.ingest_locked(&record).await {
                Ok(outcome) => break outcome,
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    let delay = self.backoff * 2u32.saturating_pow(attempt - 1);
                    log::warn!(
                        "Transient store failure for {} (attempt {}/{}): {}. Retrying in {:?}.",
                        record.id,
                        attempt,
                        self.max_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        if let Some(payload) = payload {
            if let Err(e) = self.snapshots.upsert(&record.id, &payload).await {
                log::warn!("Snapshot upsert failed for {}: {}", record.id, e);
            }
        }

        Ok(outcome)
    }

    /// The per-id serialized section: read existing state, diff, write.
    async fn ingest_locked(&self, record: &Record) -> Result<Outcome> {
        let previous = self.records.find(&record.id).await?;

        if let Some(previous) = &previous {
            if previous.url != record.url {
                log::error!(
                    "Hash collision: id {} maps to both '{}' and '{}'",
                    record.id,
                    previous.url,
                    record.url
                );
                return Err(AppError::InvariantViolation {
                    id: record.id.clone(),
                    stored_key: previous.url.clone(),
                    incoming_key: record.url.clone(),
                });
            }
        }

        let diff = self
            .detector
            .detect(previous.as_ref(), record, record.last_seen);

        if !diff.has_changes() {
            log::debug!("Record {} unchanged", record.id);
            return Ok(Outcome::Unchanged);
        }

        // Changelog first: a crash between the two writes leaves at worst
        // an orphan audit entry, never a stored change without one.
        self.changelog.append(&diff.events).await?;
        self.records.upsert(record).await?;

        match previous {
            None => {
                log::info!("Record {} created ({})", record.id, record.title);
                Ok(Outcome::Created)
            }
            Some(_) => {
                log::info!(
                    "Record {} updated, {} field change(s)",
                    record.id,
                    diff.change_count()
                );
                Ok(Outcome::Updated {
                    events: diff.change_count(),
                })
            }
        }
    }
}
