//! Canonical record state for a catalogue entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The persisted state of one catalogue entry.
///
/// `id` is derived from `url` (the natural key) and never changes for a
/// given key. Tracked string fields carry `#[serde(default)]` so that a
/// field absent in an older stored document reads back as the empty
/// string, which is the sentinel the change detector compares against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    /// Stable identifier, hex digest of the natural key
    pub id: String,

    /// Natural key: canonical source URL
    pub url: String,

    /// Display title
    pub title: String,

    /// Long-form description (untracked)
    #[serde(default)]
    pub description: String,

    /// Category name (untracked, filterable)
    #[serde(default)]
    pub category: String,

    /// Price including tax, raw string form (e.g. "£18.02")
    #[serde(default)]
    pub price_incl_tax: String,

    /// Price excluding tax, raw string form
    #[serde(default)]
    pub price_excl_tax: String,

    /// Availability text (e.g. "In stock (22 available)")
    #[serde(default)]
    pub availability: String,

    /// Rating in word form: "One" through "Five"
    #[serde(default)]
    pub rating: String,

    /// Review count
    #[serde(default)]
    pub reviews: u32,

    /// Cover image URL (untracked)
    #[serde(default)]
    pub image_url: String,

    /// When this record was last observed by an ingestion
    pub last_seen: DateTime<Utc>,
}

impl Record {
    /// String representation of a field, for change comparison.
    ///
    /// Comparison is representation-based rather than type-based so that
    /// differing storage encodings of the same logical value still line
    /// up. Unknown field names yield `None`.
    pub fn field_value(&self, name: &str) -> Option<String> {
        match name {
            "url" => Some(self.url.clone()),
            "title" => Some(self.title.clone()),
            "description" => Some(self.description.clone()),
            "category" => Some(self.category.clone()),
            "price_incl_tax" => Some(self.price_incl_tax.clone()),
            "price_excl_tax" => Some(self.price_excl_tax.clone()),
            "availability" => Some(self.availability.clone()),
            "rating" => Some(self.rating.clone()),
            "reviews" => Some(self.reviews.to_string()),
            "image_url" => Some(self.image_url.clone()),
            _ => None,
        }
    }

    /// One-line human-readable summary, used for creation events.
    pub fn summary(&self) -> String {
        self.title.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> Record {
        Record {
            id: "deadbeef".to_string(),
            url: "https://example.com/book/1".to_string(),
            title: "A Light in the Attic".to_string(),
            description: "Poems.".to_string(),
            category: "Poetry".to_string(),
            price_incl_tax: "£51.77".to_string(),
            price_excl_tax: "£51.77".to_string(),
            availability: "In stock (22 available)".to_string(),
            rating: "Three".to_string(),
            reviews: 0,
            image_url: "https://example.com/cover.jpg".to_string(),
            last_seen: Utc::now(),
        }
    }

    #[test]
    fn test_field_value_strings() {
        let record = sample_record();
        assert_eq!(
            record.field_value("price_incl_tax").as_deref(),
            Some("£51.77")
        );
        assert_eq!(record.field_value("reviews").as_deref(), Some("0"));
        assert_eq!(record.field_value("no_such_field"), None);
    }

    #[test]
    fn test_missing_fields_deserialize_as_empty() {
        let json = r#"{
            "id": "deadbeef",
            "url": "https://example.com/book/1",
            "title": "Old Doc",
            "last_seen": "2026-01-01T00:00:00Z"
        }"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.rating, "");
        assert_eq!(record.reviews, 0);
    }
}
