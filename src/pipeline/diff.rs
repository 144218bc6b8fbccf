//! Per-field change detection.
//!
//! Computes the minimal set of change events between the previously
//! stored record and a freshly normalized one.

use chrono::{DateTime, Utc};

use crate::models::{ChangeEvent, Record, TrackingConfig};

/// Events produced by one comparison.
#[derive(Debug, Clone, Default)]
pub struct DiffResult {
    /// Events in tracked-field order (or a single creation event)
    pub events: Vec<ChangeEvent>,
}

impl DiffResult {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get the total number of change events.
    pub fn change_count(&self) -> usize {
        self.events.len()
    }
}

/// Detector comparing records over a configured tracked-field set.
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    tracked: Vec<String>,
}

impl ChangeDetector {
    pub fn new(tracking: &TrackingConfig) -> Self {
        Self {
            tracked: tracking.fields.clone(),
        }
    }

    /// Compare the stored record (if any) against the incoming one.
    ///
    /// No previous record: one `created` event carrying the record
    /// summary. Otherwise: one `updated` event per tracked field whose
    /// **string representation** differs. A field absent on either side
    /// compares as the empty string, so absent-to-present transitions
    /// are reported. Untracked fields never produce events.
    pub fn detect(
        &self,
        previous: Option<&Record>,
        current: &Record,
        detected_at: DateTime<Utc>,
    ) -> DiffResult {
        let Some(previous) = previous else {
            return DiffResult {
                events: vec![ChangeEvent::created(
                    &current.id,
                    &current.summary(),
                    detected_at,
                )],
            };
        };

        let mut events = Vec::new();
        for field in &self.tracked {
            let old_value = previous.field_value(field).unwrap_or_default();
            let new_value = current.field_value(field).unwrap_or_default();

            if old_value != new_value {
                events.push(ChangeEvent::updated(
                    &current.id,
                    field,
                    &old_value,
                    &new_value,
                    detected_at,
                ));
            }
        }

        DiffResult { events }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChangeKind, RECORD_SENTINEL};

    fn make_record(price: &str, rating: &str) -> Record {
        Record {
            id: "abc123".to_string(),
            url: "https://example.com/book/1".to_string(),
            title: "Sharp Objects".to_string(),
            description: "A novel.".to_string(),
            category: "Mystery".to_string(),
            price_incl_tax: price.to_string(),
            price_excl_tax: price.to_string(),
            availability: "In stock".to_string(),
            rating: rating.to_string(),
            reviews: 0,
            image_url: String::new(),
            last_seen: Utc::now(),
        }
    }

    fn detector() -> ChangeDetector {
        ChangeDetector::new(&TrackingConfig::default())
    }

    #[test]
    fn test_no_previous_emits_creation() {
        let current = make_record("£10.00", "Four");
        let result = detector().detect(None, &current, Utc::now());

        assert!(result.has_changes());
        assert_eq!(result.change_count(), 1);
        let event = &result.events[0];
        assert_eq!(event.kind, ChangeKind::Created);
        assert_eq!(event.field, RECORD_SENTINEL);
        assert_eq!(event.new_value, "Sharp Objects");
        assert!(event.old_value.is_none());
    }

    #[test]
    fn test_identical_records_emit_nothing() {
        let record = make_record("£10.00", "Four");
        let result = detector().detect(Some(&record), &record.clone(), Utc::now());
        assert!(!result.has_changes());
    }

    #[test]
    fn test_tracked_change_emits_one_event() {
        let previous = make_record("£10.00", "Four");
        let mut current = make_record("£12.00", "Four");
        current.price_excl_tax = previous.price_excl_tax.clone();

        let result = detector().detect(Some(&previous), &current, Utc::now());
        assert_eq!(result.change_count(), 1);
        let event = &result.events[0];
        assert_eq!(event.field, "price_incl_tax");
        assert_eq!(event.old_value.as_deref(), Some("£10.00"));
        assert_eq!(event.new_value, "£12.00");
        assert_eq!(event.kind, ChangeKind::Updated);
    }

    #[test]
    fn test_untracked_change_emits_nothing() {
        let previous = make_record("£10.00", "Four");
        let mut current = previous.clone();
        current.description = "A rewritten blurb.".to_string();
        current.image_url = "https://example.com/new.jpg".to_string();

        let result = detector().detect(Some(&previous), &current, Utc::now());
        assert!(!result.has_changes());
    }

    #[test]
    fn test_absent_to_present_is_a_change() {
        let mut previous = make_record("£10.00", "Four");
        previous.availability = String::new();
        let current = make_record("£10.00", "Four");

        let result = detector().detect(Some(&previous), &current, Utc::now());
        assert_eq!(result.change_count(), 1);
        let event = &result.events[0];
        assert_eq!(event.field, "availability");
        assert_eq!(event.old_value.as_deref(), Some(""));
        assert_eq!(event.new_value, "In stock");
    }

    #[test]
    fn test_multiple_tracked_changes() {
        let previous = make_record("£10.00", "Four");
        let mut current = make_record("£12.00", "Five");
        current.reviews = 3;

        let result = detector().detect(Some(&previous), &current, Utc::now());
        let fields: Vec<&str> = result.events.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["price_incl_tax", "price_excl_tax", "rating", "reviews"]
        );
    }
}
