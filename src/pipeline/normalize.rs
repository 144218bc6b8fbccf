//! Raw record validation and normalization.
//!
//! This is the boundary where malformed upstream data is rejected before
//! it can touch storage. Validation failures collect every offending
//! field so the caller sees them all at once.

use chrono::Utc;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{RawRecord, Record, TrackingConfig};
use crate::pipeline::identity::record_id;

/// A validated record together with its optional snapshot payload.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub record: Record,
    pub payload: Option<Vec<u8>>,
}

/// Maps raw extracted fields into the canonical persisted shape.
#[derive(Debug, Clone)]
pub struct Normalizer {
    tracked: Vec<String>,
}

impl Normalizer {
    pub fn new(tracking: &TrackingConfig) -> Self {
        Self {
            tracked: tracking.fields.clone(),
        }
    }

    /// Validate and normalize one raw record.
    ///
    /// Requirements: a non-empty `url` (the natural key), a non-empty
    /// `title`, and every tracked field present in its expected shape
    /// (`reviews` must coerce to an unsigned integer, the rest must be
    /// text). Pure apart from `last_seen` assignment.
    pub fn normalize(&self, raw: &RawRecord) -> Result<Normalized> {
        let mut missing: Vec<String> = Vec::new();

        let url = match raw.text("url").map(str::trim) {
            Some(u) if !u.is_empty() => Some(canonical_key(u)),
            _ => {
                missing.push("url".to_string());
                None
            }
        };

        let title = match raw.text("title").map(str::trim) {
            Some(t) if !t.is_empty() => Some(t.to_string()),
            _ => {
                missing.push("title".to_string());
                None
            }
        };

        let reviews = raw.unsigned("reviews");
        for field in &self.tracked {
            if field == "reviews" {
                if reviews.is_none() {
                    missing.push("reviews".to_string());
                }
            } else if raw.text(field).is_none() {
                missing.push(field.clone());
            }
        }

        if !missing.is_empty() {
            return Err(AppError::Validation { fields: missing });
        }

        let url = url.unwrap_or_default();
        let id = record_id(&url);

        let text = |key: &str| raw.text(key).unwrap_or_default().trim().to_string();

        let record = Record {
            id,
            url,
            title: title.unwrap_or_default(),
            description: text("description"),
            category: text("category"),
            price_incl_tax: text("price_incl_tax"),
            price_excl_tax: text("price_excl_tax"),
            availability: text("availability"),
            rating: text("rating"),
            reviews: reviews.unwrap_or(0),
            image_url: text("image_url"),
            last_seen: Utc::now(),
        };

        Ok(Normalized {
            record,
            payload: raw.payload(),
        })
    }
}

/// Canonical form of the natural key.
///
/// Absolute URLs are normalized through the `url` crate (scheme and host
/// lowercased, default ports dropped). Keys that are not absolute URLs
/// are kept verbatim; identity only needs determinism, not URL validity.
fn canonical_key(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(parsed) => parsed.to_string(),
        Err(_) => raw.to_string(),
    }
}
