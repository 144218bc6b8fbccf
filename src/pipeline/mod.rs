//! The ingestion pipeline.
//!
//! - `identity`: stable record ids from natural keys
//! - `normalize`: raw-record validation into the canonical shape
//! - `diff`: tracked-field change detection
//! - `ingest`: the coordinator tying the steps together
//! - `locks`: per-id serialization primitive

pub mod diff;
pub mod identity;
pub mod ingest;
pub mod locks;
pub mod normalize;

pub use diff::{ChangeDetector, DiffResult};
pub use identity::record_id;
pub use ingest::Ingestor;
pub use locks::KeyedLocks;
pub use normalize::{Normalized, Normalizer};
