//! Read-side contract over the primary store and the changelog.
//!
//! Mirrors what the export/report layer consumes: filtered listings of
//! current record state, lookup by id, and changelog windows.

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::error::{AppError, Result};
use crate::models::{ChangeEvent, Record};
use crate::storage::{ChangelogStore, RecordStore};
use crate::utils::{parse_price, rating_to_number};

/// Sort keys for record listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Ascending by numeric price
    Price,
    /// Descending by rating
    Rating,
    /// Descending by review count
    Reviews,
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "price" => Ok(Self::Price),
            "rating" => Ok(Self::Rating),
            "reviews" => Ok(Self::Reviews),
            other => Err(AppError::config(format!(
                "unknown sort key '{other}' (expected price, rating or reviews)"
            ))),
        }
    }
}

/// Filters, sorting and pagination for [`Catalog::list`].
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Case-insensitive exact category match
    pub category: Option<String>,
    /// Lower bound on the numeric price parsed from `price_incl_tax`
    pub min_price: Option<f64>,
    /// Upper bound on the numeric price
    pub max_price: Option<f64>,
    /// Minimum numeric rating (rating word mapped to 1.0..5.0)
    pub min_rating: Option<f64>,
    pub sort_by: Option<SortKey>,
    pub offset: usize,
    pub limit: Option<usize>,
}

/// Wire shape of one changelog entry as surfaced to readers.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChangeView {
    pub timestamp: DateTime<Utc>,
    pub record_id: String,
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: String,
    pub kind: crate::models::ChangeKind,
}

impl From<&ChangeEvent> for ChangeView {
    fn from(event: &ChangeEvent) -> Self {
        Self {
            timestamp: event.detected_at,
            record_id: event.record_id.clone(),
            field: event.field.clone(),
            old_value: event.old_value.clone(),
            new_value: event.new_value.clone(),
            kind: event.kind,
        }
    }
}

/// Read service over the stores.
pub struct Catalog {
    records: Arc<dyn RecordStore>,
    changelog: Arc<dyn ChangelogStore>,
}

impl Catalog {
    pub fn new(records: Arc<dyn RecordStore>, changelog: Arc<dyn ChangelogStore>) -> Self {
        Self { records, changelog }
    }

    /// Current record for an id, or `None`.
    pub async fn get(&self, id: &str) -> Result<Option<Record>> {
        self.records.find(id).await
    }

    /// Records matching the filter, sorted and paginated.
    ///
    /// Price and rating filters operate on values derived from the raw
    /// string fields; records whose field does not parse are excluded
    /// when the corresponding bound is set.
    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<Record>> {
        let mut records = self.records.list().await?;

        if let Some(category) = &filter.category {
            records.retain(|r| r.category.eq_ignore_ascii_case(category));
        }

        if filter.min_price.is_some() || filter.max_price.is_some() {
            records.retain(|r| {
                let Some(price) = parse_price(&r.price_incl_tax) else {
                    return false;
                };
                filter.min_price.is_none_or(|min| price >= min)
                    && filter.max_price.is_none_or(|max| price <= max)
            });
        }

        if let Some(min_rating) = filter.min_rating {
            records.retain(|r| rating_to_number(&r.rating).is_some_and(|n| n >= min_rating));
        }

        match filter.sort_by {
            Some(SortKey::Price) => {
                records.sort_by(|a, b| cmp_f64(derived_price(a), derived_price(b)));
            }
            Some(SortKey::Rating) => {
                records.sort_by(|a, b| cmp_f64(derived_rating(b), derived_rating(a)));
            }
            Some(SortKey::Reviews) => {
                records.sort_by(|a, b| b.reviews.cmp(&a.reviews));
            }
            None => {}
        }

        let page: Vec<Record> = records
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit.unwrap_or(usize::MAX))
            .collect();
        Ok(page)
    }

    /// Events detected within `[from, to)`, ordered by detection time.
    pub async fn changes_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ChangeEvent>> {
        self.changelog.events_between(from, to).await
    }

    /// Events from the last `hours` hours, the daily-report window.
    pub async fn changes_since_hours(&self, hours: i64) -> Result<Vec<ChangeEvent>> {
        let now = Utc::now();
        self.changes_between(now - Duration::hours(hours), now).await
    }
}

fn derived_price(record: &Record) -> f64 {
    parse_price(&record.price_incl_tax).unwrap_or(0.0)
}

fn derived_rating(record: &Record) -> f64 {
    rating_to_number(&record.rating).unwrap_or(0.0)
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryChangelog, MemoryRecordStore};

    fn make_record(id: &str, category: &str, price: &str, rating: &str, reviews: u32) -> Record {
        Record {
            id: id.to_string(),
            url: format!("https://example.com/{id}"),
            title: format!("Book {id}"),
            description: String::new(),
            category: category.to_string(),
            price_incl_tax: price.to_string(),
            price_excl_tax: price.to_string(),
            availability: "In stock".to_string(),
            rating: rating.to_string(),
            reviews,
            image_url: String::new(),
            last_seen: Utc::now(),
        }
    }

    async fn catalog_with(records: Vec<Record>) -> Catalog {
        let store = Arc::new(MemoryRecordStore::new());
        for record in &records {
            store.upsert(record).await.unwrap();
        }
        Catalog::new(store, Arc::new(MemoryChangelog::new()))
    }

    #[tokio::test]
    async fn test_category_filter_case_insensitive() {
        let catalog = catalog_with(vec![
            make_record("a", "Poetry", "£10.00", "Two", 0),
            make_record("b", "Mystery", "£12.00", "Four", 3),
        ])
        .await;

        let filter = ListFilter {
            category: Some("poetry".to_string()),
            ..Default::default()
        };
        let listed = catalog.list(&filter).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "a");
    }

    #[tokio::test]
    async fn test_price_range_uses_derived_value() {
        let catalog = catalog_with(vec![
            make_record("a", "Poetry", "£10.00", "Two", 0),
            make_record("b", "Poetry", "£25.50", "Four", 0),
            make_record("c", "Poetry", "not a price", "Four", 0),
        ])
        .await;

        let filter = ListFilter {
            min_price: Some(5.0),
            max_price: Some(20.0),
            ..Default::default()
        };
        let listed = catalog.list(&filter).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "a");
    }

    #[tokio::test]
    async fn test_min_rating_threshold() {
        let catalog = catalog_with(vec![
            make_record("a", "Poetry", "£10.00", "Two", 0),
            make_record("b", "Poetry", "£12.00", "Four", 0),
            make_record("c", "Poetry", "£13.00", "Five", 0),
        ])
        .await;

        let filter = ListFilter {
            min_rating: Some(4.0),
            ..Default::default()
        };
        let mut listed = catalog.list(&filter).await.unwrap();
        listed.sort_by(|a, b| a.id.cmp(&b.id));
        let ids: Vec<&str> = listed.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_sort_and_pagination() {
        let catalog = catalog_with(vec![
            make_record("a", "Poetry", "£30.00", "Two", 5),
            make_record("b", "Poetry", "£10.00", "Four", 9),
            make_record("c", "Poetry", "£20.00", "Five", 1),
        ])
        .await;

        let filter = ListFilter {
            sort_by: Some(SortKey::Price),
            ..Default::default()
        };
        let listed = catalog.list(&filter).await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        let filter = ListFilter {
            sort_by: Some(SortKey::Reviews),
            offset: 1,
            limit: Some(1),
            ..Default::default()
        };
        let listed = catalog.list(&filter).await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!(SortKey::from_str("Rating").unwrap(), SortKey::Rating);
        assert!(SortKey::from_str("title").is_err());
    }
}
