//! Content digest primitives.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::canonicalizer::canonical_bytes;

/// Prefix carried by every hash string produced by this crate.
pub const HASH_PREFIX: &str = "sha256:";

/// Errors for digest construction.
#[derive(Debug, Error)]
pub enum DigestError {
    /// The string is not a `sha256:` prefixed lowercase hex digest.
    #[error("{field} ('{value}') is not a valid hash string")]
    PatternMismatch {
        /// Field name that failed validation.
        field: &'static str,
        /// Offending value.
        value: String,
    },
}

/// A `sha256:` prefixed lowercase-hex content fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Creates a new instance without validation; callers are responsible for conformity.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Parses a validated hash string (`sha256:` + 64 lowercase hex characters).
    pub fn parse(value: impl Into<String>) -> Result<Self, DigestError> {
        let s = value.into();
        let re = Regex::new(r"^sha256:[0-9a-f]{64}$").expect("invalid regex");
        if !re.is_match(&s) {
            return Err(DigestError::PatternMismatch {
                field: "content_hash",
                value: s,
            });
        }
        Ok(Self(s))
    }

    /// Returns the hash string including its prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hashes raw bytes into a prefixed lowercase-hex string.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{}{}", HASH_PREFIX, hex::encode(hasher.finalize()))
}

/// Computes the content fingerprint of a structured value.
///
/// Formula: `sha256(canonical_bytes(value))`, rendered as
/// `"sha256:" + 64 lowercase hex characters`.
pub fn content_hash(value: &Value) -> ContentHash {
    ContentHash(sha256_hex(&canonical_bytes(value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_hash_has_prefixed_hex_shape() {
        let hash = content_hash(&json!({"val": 1}));
        assert!(hash.as_str().starts_with(HASH_PREFIX));
        assert_eq!(hash.as_str().len(), HASH_PREFIX.len() + 64);
        ContentHash::parse(hash.as_str()).unwrap();
    }

    #[test]
    fn content_hash_ignores_key_insertion_order() {
        let a: Value = serde_json::from_str(r#"{"x":1,"y":2}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"y":2,"x":1}"#).unwrap();
        assert_eq!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn content_hash_is_stable_across_calls() {
        let value = json!({"nested": {"list": [1, 2.5, "three"], "ok": true}});
        assert_eq!(content_hash(&value), content_hash(&value));
    }

    #[test]
    fn parse_rejects_malformed_hash_strings() {
        assert!(ContentHash::parse("sha256:abc").is_err());
        assert!(ContentHash::parse(format!("md5:{}", "a".repeat(64))).is_err());
        assert!(ContentHash::parse(format!("sha256:{}", "A".repeat(64))).is_err());
    }
}
