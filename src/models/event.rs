//! Immutable change events, the audit trail of record evolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel field name for whole-record creation events.
pub const RECORD_SENTINEL: &str = "__record__";

/// What kind of change an event records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
}

/// One observed change to a tracked attribute of a record.
///
/// Append-only: events are never mutated or deleted by the pipeline.
/// Within a single record id, events are appended in ingestion order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeEvent {
    /// Id of the record the change belongs to
    pub record_id: String,

    /// Changed field name, or [`RECORD_SENTINEL`] for creation
    pub field: String,

    /// Previous string value; absent for creation events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,

    /// New string value (the record summary for creation events)
    pub new_value: String,

    pub kind: ChangeKind,

    /// When the change was detected (ingestion time)
    pub detected_at: DateTime<Utc>,
}

impl ChangeEvent {
    /// Build a creation event for a brand-new record.
    pub fn created(record_id: &str, summary: &str, detected_at: DateTime<Utc>) -> Self {
        Self {
            record_id: record_id.to_string(),
            field: RECORD_SENTINEL.to_string(),
            old_value: None,
            new_value: summary.to_string(),
            kind: ChangeKind::Created,
            detected_at,
        }
    }

    /// Build an update event for one changed field.
    pub fn updated(
        record_id: &str,
        field: &str,
        old_value: &str,
        new_value: &str,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            record_id: record_id.to_string(),
            field: field.to_string(),
            old_value: Some(old_value.to_string()),
            new_value: new_value.to_string(),
            kind: ChangeKind::Updated,
            detected_at,
        }
    }
}
