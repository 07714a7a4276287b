//! Bundle sealing.
//!
//! Sealing is the only mutation point in the system: it validates the item
//! list, threads the hash chain, computes the root, and returns a bundle
//! that is intended to be treated as read-only from then on. The caller
//! supplies the bundle identifier and timestamp so sealing stays a pure
//! function of its inputs.

use serde_json::Value;

use crate::bundle::{EvidenceBundle, EvidenceItem, ImmutabilityProof, CURRENT_VERSION};
use crate::chain::{build_hash_chain, compute_root_hash, ChainInput, ProofVersion, MAX_CHAIN_ITEMS};
use crate::errors::SealError;

/// One unsealed evidence record.
#[derive(Debug, Clone)]
pub struct SealItem {
    /// Caller-assigned identifier, must be non-empty.
    pub item_id: String,
    /// Caller-assigned content type, must be non-empty.
    pub content_type: String,
    /// Arbitrary structured content.
    pub content: Value,
}

/// Everything needed to seal one bundle.
#[derive(Debug, Clone)]
pub struct SealRequest {
    /// Identifier for the sealed bundle.
    pub bundle_id: String,
    /// Seal timestamp (RFC3339), supplied by the caller.
    pub created_at: String,
    /// Ordered evidence records.
    pub items: Vec<SealItem>,
    /// Optional free-form metadata; not bound into the chain.
    pub metadata: Option<Value>,
}

/// Seals ordered evidence into a tamper-evident bundle.
#[derive(Debug, Clone)]
pub struct Sealer {
    max_items: usize,
}

impl Default for Sealer {
    fn default() -> Self {
        Self {
            max_items: MAX_CHAIN_ITEMS,
        }
    }
}

impl Sealer {
    /// Creates a sealer with the default chain ceiling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the chain ceiling. The default bounds worst-case work and
    /// should only be raised deliberately.
    pub fn with_max_items(max_items: usize) -> Self {
        Self { max_items }
    }

    /// Seals the request into a complete [`EvidenceBundle`].
    ///
    /// Fails fast on malformed input: an empty item list, or any item with
    /// an empty `item_id` or `content_type` (the error names the offending
    /// index and field). Always produces the current proof version.
    pub fn seal(&self, request: SealRequest) -> Result<EvidenceBundle, SealError> {
        if request.items.is_empty() {
            return Err(SealError::EmptyItems);
        }
        for (index, item) in request.items.iter().enumerate() {
            if item.item_id.is_empty() {
                return Err(SealError::MissingItemField {
                    index,
                    field: "item_id",
                });
            }
            if item.content_type.is_empty() {
                return Err(SealError::MissingItemField {
                    index,
                    field: "content_type",
                });
            }
        }

        let inputs: Vec<ChainInput<'_>> = request
            .items
            .iter()
            .map(|item| ChainInput {
                item_id: &item.item_id,
                content_type: &item.content_type,
                content: &item.content,
            })
            .collect();
        let hash_chain = build_hash_chain(&inputs, ProofVersion::Current, self.max_items)?;
        let root_hash = compute_root_hash(&hash_chain)?;

        let items = request
            .items
            .into_iter()
            .zip(hash_chain.iter())
            .map(|(item, link)| EvidenceItem {
                item_id: item.item_id,
                content_type: item.content_type,
                content: item.content,
                content_hash: link.content_hash.clone(),
                sequence: link.sequence,
            })
            .collect();

        Ok(EvidenceBundle {
            bundle_id: request.bundle_id,
            version: CURRENT_VERSION.to_string(),
            created_at: request.created_at,
            items,
            immutability_proof: ImmutabilityProof {
                hash_chain,
                root_hash,
            },
            signatures: None,
            metadata: request.metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::GENESIS_PREVIOUS_HASH;
    use serde_json::json;

    fn two_items() -> Vec<SealItem> {
        vec![
            SealItem {
                item_id: "i1".to_string(),
                content_type: "test/a".to_string(),
                content: json!({"val": 1}),
            },
            SealItem {
                item_id: "i2".to_string(),
                content_type: "test/b".to_string(),
                content: json!({"val": 2}),
            },
        ]
    }

    fn request(items: Vec<SealItem>) -> SealRequest {
        SealRequest {
            bundle_id: "bundle-1".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            items,
            metadata: None,
        }
    }

    #[test]
    fn seal_annotates_items_and_builds_proof() {
        let bundle = Sealer::new().seal(request(two_items())).unwrap();

        assert_eq!(bundle.version, CURRENT_VERSION);
        assert_eq!(bundle.items[0].sequence, 0);
        assert_eq!(bundle.items[1].sequence, 1);
        for item in &bundle.items {
            assert!(item.content_hash.as_str().starts_with("sha256:"));
            assert_eq!(item.content_hash.as_str().len(), "sha256:".len() + 64);
        }

        let chain = &bundle.immutability_proof.hash_chain;
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].previous_hash, GENESIS_PREVIOUS_HASH);
        assert_eq!(chain[1].previous_hash, chain[0].chain_hash);
    }

    #[test]
    fn seal_rejects_empty_item_list() {
        let err = Sealer::new().seal(request(vec![])).unwrap_err();
        assert!(matches!(err, SealError::EmptyItems));
    }

    #[test]
    fn seal_names_the_offending_item_field() {
        let mut items = two_items();
        items[1].content_type = String::new();
        let err = Sealer::new().seal(request(items)).unwrap_err();
        assert!(matches!(
            err,
            SealError::MissingItemField { index: 1, field: "content_type" }
        ));
    }

    #[test]
    fn seal_enforces_the_configured_ceiling() {
        let items: Vec<SealItem> = (0..3)
            .map(|i| SealItem {
                item_id: format!("i{i}"),
                content_type: "test/x".to_string(),
                content: json!({"val": i}),
            })
            .collect();

        assert!(Sealer::with_max_items(3).seal(request(items.clone())).is_ok());
        let err = Sealer::with_max_items(2).seal(request(items)).unwrap_err();
        assert!(matches!(err, SealError::TooManyItems { count: 3, max: 2 }));
    }
}
