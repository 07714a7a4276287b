//! Data model for sealed evidence bundles.
//!
//! All entities are created in one atomic seal and treated as immutable
//! afterwards; mutation invalidates the chain, which is the detection
//! mechanism. Field names here are the persisted document shape and must not
//! change.

use sealchain_canonical::ContentHash;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Bundle versions accepted for verification.
pub const SUPPORTED_VERSIONS: [&str; 2] = ["1.0", "1.1"];

/// Version stamped onto newly sealed bundles.
pub const CURRENT_VERSION: &str = "1.1";

/// Top-level fields every bundle document must carry.
pub const REQUIRED_FIELDS: [&str; 5] =
    ["bundle_id", "version", "created_at", "items", "immutability_proof"];

/// One unit of evidence inside a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Caller-assigned identifier, non-empty.
    pub item_id: String,
    /// Caller-assigned content type, non-empty.
    pub content_type: String,
    /// Arbitrary structured content.
    pub content: Value,
    /// Content fingerprint computed at seal time.
    pub content_hash: ContentHash,
    /// Zero-based position in the owning bundle's item list.
    pub sequence: u64,
}

/// One node in the immutability chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashChainLink {
    /// Zero-based position in the chain.
    pub sequence: u64,
    /// Item identifier bound into the chain hash. Absent only in legacy
    /// chains, which omit item identity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    /// Item content type bound into the chain hash. Absent only in legacy
    /// chains.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Content fingerprint of the item at this position.
    pub content_hash: ContentHash,
    /// Predecessor's chain hash, or the genesis sentinel at sequence 0.
    pub previous_hash: String,
    /// Hash binding this link to its fields and its predecessor.
    pub chain_hash: String,
}

/// Tamper-evidence envelope: the chain plus its root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImmutabilityProof {
    /// Ordered hash chain, one link per item.
    pub hash_chain: Vec<HashChainLink>,
    /// Root digest summarizing the whole chain.
    pub root_hash: String,
}

/// Signature algorithms the verifier understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureAlgorithm {
    /// Ed25519 over the canonical bundle bytes.
    Ed25519,
    /// RSA PKCS#1 v1.5 with SHA-256.
    RsaSha256,
    /// ECDSA over P-256 with SHA-256.
    EcdsaP256,
    /// HMAC-SHA256 with a shared secret.
    HmacSha256,
}

impl SignatureAlgorithm {
    /// Returns the wire name of the algorithm.
    pub fn as_str(self) -> &'static str {
        match self {
            SignatureAlgorithm::Ed25519 => "ed25519",
            SignatureAlgorithm::RsaSha256 => "rsa-sha256",
            SignatureAlgorithm::EcdsaP256 => "ecdsa-p256",
            SignatureAlgorithm::HmacSha256 => "hmac-sha256",
        }
    }
}

/// Optional authenticity attestation over a whole bundle.
///
/// The signed message is the canonical serialization of the bundle with the
/// `signatures` member excluded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleSignature {
    /// Identifier of this signature.
    pub signature_id: String,
    /// Algorithm used to produce `signature_value`.
    pub algorithm: SignatureAlgorithm,
    /// Identifier of the signer.
    pub signer_id: String,
    /// Signature bytes, base64 encoded.
    pub signature_value: String,
    /// When the signature was produced (RFC3339).
    pub signed_at: String,
    /// Key identifier for public-key resolution; falls back to `default`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_id: Option<String>,
}

/// The sealed unit of audit evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceBundle {
    /// Caller-assigned bundle identifier.
    pub bundle_id: String,
    /// Proof-compatibility version, one of [`SUPPORTED_VERSIONS`].
    pub version: String,
    /// When the bundle was sealed (RFC3339).
    pub created_at: String,
    /// Ordered evidence items.
    pub items: Vec<EvidenceItem>,
    /// Tamper-evidence envelope over the items.
    pub immutability_proof: ImmutabilityProof,
    /// Optional signatures over the bundle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signatures: Option<Vec<BundleSignature>>,
    /// Optional free-form metadata; not bound into the chain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_tags_use_kebab_case() {
        assert_eq!(
            serde_json::to_string(&SignatureAlgorithm::HmacSha256).unwrap(),
            r#""hmac-sha256""#
        );
        assert_eq!(
            serde_json::from_str::<SignatureAlgorithm>(r#""ecdsa-p256""#).unwrap(),
            SignatureAlgorithm::EcdsaP256
        );
        assert_eq!(SignatureAlgorithm::Ed25519.as_str(), "ed25519");
    }

    #[test]
    fn absent_optional_members_are_omitted() {
        let link = HashChainLink {
            sequence: 0,
            item_id: None,
            content_type: None,
            content_hash: ContentHash::new(format!("sha256:{}", "0".repeat(64))),
            previous_hash: "genesis".to_string(),
            chain_hash: format!("sha256:{}", "1".repeat(64)),
        };
        let value = serde_json::to_value(&link).unwrap();
        assert!(value.get("item_id").is_none());
        assert!(value.get("content_type").is_none());
    }
}
