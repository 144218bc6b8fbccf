// src/models/mod.rs

//! Domain models for the ingestion pipeline.
//!
//! This module contains all data structures used throughout the
//! application, organized by their primary purpose.

mod config;
mod event;
mod raw;
mod record;

// Re-export all public types
pub use config::{Config, LoggingConfig, PipelineConfig, StorageConfig, TrackingConfig};
pub use event::{ChangeEvent, ChangeKind, RECORD_SENTINEL};
pub use raw::{PAYLOAD_FIELD, RawRecord};
pub use record::Record;

/// What a single pipeline invocation did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// First successful ingestion of this natural key
    Created,
    /// Tracked fields changed; `events` changelog entries were appended
    Updated { events: usize },
    /// Identical to the stored state; nothing written to the primary store
    Unchanged,
}

/// Tally of a batch ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl IngestStats {
    /// Total records submitted.
    pub fn total(&self) -> usize {
        self.created + self.updated + self.unchanged + self.rejected + self.failed
    }
}
