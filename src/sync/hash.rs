//! Content hashing for variables documents.
//!
//! The hash fingerprints a document by its serialized JSON so two copies can
//! be compared at a glance in status output and logs. Key order is part of
//! the serialized form, so the hash is used for display only; equality of
//! copies is always decided by [`crate::sync::equals`].

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::sync::ConfigDocument;

/// Compute a SHA256 hash of a document's compact JSON.
#[must_use]
pub fn content_hash(doc: &ConfigDocument) -> String {
    let json = Value::Object(doc.clone()).to_string();
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// First 12 hex characters of a hash, for terminal output.
#[must_use]
pub fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::testing::doc;
    use serde_json::json;

    #[test]
    fn test_content_hash_deterministic() {
        let a = doc(json!({"region": "eu-west-1", "count": 3}));

        let hash1 = content_hash(&a);
        let hash2 = content_hash(&a);

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64); // SHA256 produces 64 hex chars
    }

    #[test]
    fn test_content_hash_changes_with_content() {
        let a = doc(json!({"count": 3}));
        let b = doc(json!({"count": 4}));

        assert_ne!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn test_short_hash() {
        let hash = content_hash(&ConfigDocument::new());
        assert_eq!(short_hash(&hash).len(), 12);
        assert_eq!(short_hash("abc"), "abc");
    }
}
