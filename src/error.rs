// src/error.rs

//! Unified error handling for the ingestion pipeline.

use std::fmt;

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A raw record failed validation before reaching storage.
    #[error("Validation error: missing or malformed field(s): {}", fields.join(", "))]
    Validation { fields: Vec<String> },

    /// A store operation failed for a (presumed) temporary reason.
    #[error("Store error: {0}")]
    Store(String),

    /// Two distinct natural keys produced the same record id.
    #[error("Invariant violation for id {id}: stored key '{stored_key}' != incoming key '{incoming_key}'")]
    InvariantViolation {
        id: String,
        stored_key: String,
        incoming_key: String,
    },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Create a validation error naming the offending fields.
    pub fn validation(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Validation {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a validation error for a single field.
    pub fn invalid_field(field: impl Into<String>) -> Self {
        Self::Validation {
            fields: vec![field.into()],
        }
    }

    /// Create a transient store error.
    pub fn store(message: impl fmt::Display) -> Self {
        Self::Store(message.to_string())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether retrying the failed operation could succeed.
    ///
    /// Validation and invariant errors are permanent for a given record;
    /// retrying cannot fix bad input. Store and I/O failures are assumed
    /// temporary.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_lists_fields() {
        let err = AppError::validation(["price_incl_tax", "rating"]);
        let msg = err.to_string();
        assert!(msg.contains("price_incl_tax"));
        assert!(msg.contains("rating"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(AppError::store("connection reset").is_transient());
        assert!(!AppError::invalid_field("url").is_transient());
        assert!(
            !AppError::InvariantViolation {
                id: "abc".into(),
                stored_key: "u1".into(),
                incoming_key: "u2".into(),
            }
            .is_transient()
        );
    }
}
