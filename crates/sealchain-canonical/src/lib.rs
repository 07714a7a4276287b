//! Canonical serialization primitives for sealchain bundles.
//!
//! Everything that participates in hashing lives downstream of this crate:
//! the canonical text produced here is a wire-format contract, and
//! independent implementations must reproduce it byte for byte. The rules
//! are RFC 8785-style: sorted object keys, no whitespace, minimal string
//! escaping, and fixed numeric rendering.
//!
#![deny(missing_docs)]

/// Deterministic canonical JSON text encoding.
pub mod canonicalizer;
/// Content digest primitives (`sha256:` prefixed hex strings).
pub mod digest;

pub use canonicalizer::{canonical_bytes, to_canonical_json};
pub use digest::{content_hash, sha256_hex, ContentHash, DigestError, HASH_PREFIX};
