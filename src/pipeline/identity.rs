//! Content-derived record identity.

use sha2::{Digest, Sha256};

/// Derive the stable record id from a natural key.
///
/// SHA-256 over the UTF-8 bytes of the key, rendered as lowercase hex.
/// Deterministic: the same key always yields the same id. Distinct keys
/// are assumed non-colliding; the coordinator treats a collision as an
/// invariant violation rather than handling it.
pub fn record_id(natural_key: &str) -> String {
    let digest = Sha256::digest(natural_key.as_bytes());
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let a = record_id("https://example.com/book/1");
        let b = record_id("https://example.com/book/1");
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_keys_differ() {
        assert_ne!(
            record_id("https://example.com/book/1"),
            record_id("https://example.com/book/2")
        );
    }

    #[test]
    fn test_known_digest() {
        // sha256("u1")
        assert_eq!(
            record_id("u1"),
            "bb82030dbc2bcaba32a90bf2e207a84a856fc5f033b77c480836ab6f77f40f19"
        );
    }
}
