//! Intake runner: the upstream boundary of the pipeline.
//!
//! The crawl frontier delivers raw records at-least-once and unordered
//! across ids. This runner drains a bounded channel of them and drives
//! the coordinator with bounded parallelism; per-id ordering is the
//! coordinator's job, not the runner's.

use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt};
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::models::{IngestStats, Outcome, RawRecord};
use crate::pipeline::Ingestor;

/// Drains raw records into the ingestion pipeline.
pub struct IntakeRunner {
    ingestor: Arc<Ingestor>,
    concurrency: usize,
}

impl IntakeRunner {
    pub fn new(ingestor: Arc<Ingestor>, concurrency: usize) -> Self {
        Self {
            ingestor,
            concurrency: concurrency.max(1),
        }
    }

    /// Create the bounded intake channel producers submit into.
    ///
    /// A full channel blocks the submitting producer rather than failing
    /// the submission.
    pub fn channel(capacity: usize) -> (mpsc::Sender<RawRecord>, mpsc::Receiver<RawRecord>) {
        mpsc::channel(capacity.max(1))
    }

    /// Process records from the channel until all senders are dropped.
    pub async fn run(&self, receiver: mpsc::Receiver<RawRecord>) -> IngestStats {
        let records = stream::unfold(receiver, |mut rx| async move {
            rx.recv().await.map(|record| (record, rx))
        });
        self.run_stream(records).await
    }

    /// Process an already-collected batch of records.
    pub async fn run_batch(&self, records: Vec<RawRecord>) -> IngestStats {
        self.run_stream(stream::iter(records)).await
    }

    async fn run_stream(&self, records: impl Stream<Item = RawRecord>) -> IngestStats {
        let mut stats = IngestStats::default();

        let mut outcomes = std::pin::pin!(
            records
                .map(|raw| {
                    let ingestor = Arc::clone(&self.ingestor);
                    async move { ingestor.process(&raw).await }
                })
                .buffer_unordered(self.concurrency)
        );

        while let Some(result) = outcomes.next().await {
            match result {
                Ok(Outcome::Created) => stats.created += 1,
                Ok(Outcome::Updated { .. }) => stats.updated += 1,
                Ok(Outcome::Unchanged) => stats.unchanged += 1,
                Err(AppError::Validation { fields }) => {
                    stats.rejected += 1;
                    log::warn!("Rejected record, bad field(s): {}", fields.join(", "));
                }
                Err(error) => {
                    stats.failed += 1;
                    log::error!("Ingestion failed: {error}");
                }
            }
        }

        log::info!(
            "Intake finished: {} created, {} updated, {} unchanged, {} rejected, {} failed",
            stats.created,
            stats.updated,
            stats.unchanged,
            stats.rejected,
            stats.failed
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::models::Config;
    use crate::storage::{MemoryChangelog, MemoryRecordStore, MemorySnapshotStore};

    fn runner() -> (IntakeRunner, Arc<MemoryChangelog>) {
        let changelog = Arc::new(MemoryChangelog::new());
        let ingestor = Arc::new(Ingestor::new(
            &Config::default(),
            Arc::new(MemoryRecordStore::new()),
            Arc::new(MemorySnapshotStore::new()),
            changelog.clone(),
        ));
        (IntakeRunner::new(ingestor, 4), changelog)
    }

    fn raw(url: &str, price: &str) -> RawRecord {
        RawRecord::new()
            .set("url", url)
            .set("title", "Title")
            .set("price_incl_tax", price)
            .set("price_excl_tax", price)
            .set("availability", "In stock")
            .set("rating", "Three")
            .set("reviews", json!(0))
    }

    #[tokio::test]
    async fn test_batch_tallies_outcomes() {
        let (runner, _changelog) = runner();

        let stats = runner
            .run_batch(vec![
                raw("u1", "£10.00"),
                raw("u2", "£11.00"),
                raw("u1", "£10.00"),                 // duplicate delivery
                RawRecord::new().set("title", "x"),  // missing natural key
            ])
            .await;

        assert_eq!(stats.created, 2);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.created + stats.unchanged + stats.updated, 3);
        assert_eq!(stats.total(), 4);
    }

    #[tokio::test]
    async fn test_channel_drains_until_closed() {
        let (runner, changelog) = runner();
        let (tx, rx) = IntakeRunner::channel(2);

        let producer = tokio::spawn(async move {
            for i in 0..5 {
                tx.send(raw(&format!("u{i}"), "£10.00")).await.unwrap();
            }
        });

        let stats = runner.run(rx).await;
        producer.await.unwrap();

        assert_eq!(stats.created, 5);
        assert_eq!(changelog.all().await.len(), 5);
    }
}
