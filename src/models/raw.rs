//! Raw extracted record, as delivered by the crawl frontier.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An unvalidated record straight from the extractor: a mapping of field
/// name to raw JSON value. Includes the natural key (`url`) and optionally
/// a large opaque payload under `raw_html`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    pub fields: Map<String, Value>,
}

/// Key under which the opaque page payload travels.
pub const PAYLOAD_FIELD: &str = "raw_html";

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field value. Convenience for tests and builders.
    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// A field as text, if present and textual.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// A field coerced to an unsigned integer: accepts a JSON number or a
    /// numeric string. `None` when absent or not coercible.
    pub fn unsigned(&self, key: &str) -> Option<u32> {
        match self.fields.get(key)? {
            Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Extract the opaque payload, if any.
    pub fn payload(&self) -> Option<Vec<u8>> {
        self.text(PAYLOAD_FIELD).map(|s| s.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unsigned_coercion() {
        let raw = RawRecord::new().set("reviews", json!(3)).set("other", "12");
        assert_eq!(raw.unsigned("reviews"), Some(3));
        assert_eq!(raw.unsigned("other"), Some(12));
        assert_eq!(raw.unsigned("missing"), None);

        let bad = RawRecord::new().set("reviews", "a few");
        assert_eq!(bad.unsigned("reviews"), None);
    }

    #[test]
    fn test_transparent_deserialization() {
        let raw: RawRecord =
            serde_json::from_str(r#"{"url": "https://x", "reviews": 2}"#).unwrap();
        assert_eq!(raw.text("url"), Some("https://x"));
        assert_eq!(raw.unsigned("reviews"), Some(2));
    }
}
