//! Hash-chain construction and root aggregation.
//!
//! Every link's hash depends on its predecessor, so reordering or mutating
//! any downstream record surfaces as a broken chain. The preimage layout is
//! a wire-format contract shared with other implementations.

use sealchain_canonical::{content_hash, sha256_hex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::bundle::HashChainLink;
use crate::errors::{ChainError, SealError};

/// Previous-hash sentinel for the first link. Can never collide with a
/// `sha256:` hash string.
pub const GENESIS_PREVIOUS_HASH: &str = "genesis";

/// Default ceiling on chain length. A safety bound on worst-case memory and
/// time, not a domain constraint.
pub const MAX_CHAIN_ITEMS: usize = 10_000;

/// Which chain-hash preimage layout a proof uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofVersion {
    /// `sequence | item_id | content_type | content_hash | previous_hash`.
    Current,
    /// `sequence | content_hash | previous_hash`. Deprecated: omits item
    /// identity, so accepted only for backward verification and never
    /// produced by sealing.
    Legacy,
}

/// Input to the chain builder: identity plus content, prior to hashing.
#[derive(Debug, Clone)]
pub struct ChainInput<'a> {
    /// Caller-assigned item identifier.
    pub item_id: &'a str,
    /// Caller-assigned content type.
    pub content_type: &'a str,
    /// Structured content to fingerprint.
    pub content: &'a Value,
}

/// Computes one link's chain hash from its constituent fields.
pub fn chain_link_hash(
    version: ProofVersion,
    sequence: u64,
    item_id: &str,
    content_type: &str,
    content_hash: &str,
    previous_hash: &str,
) -> String {
    let preimage = match version {
        ProofVersion::Current => format!(
            "{}|{}|{}|{}|{}",
            sequence, item_id, content_type, content_hash, previous_hash
        ),
        ProofVersion::Legacy => format!("{}|{}|{}", sequence, content_hash, previous_hash),
    };
    sha256_hex(preimage.as_bytes())
}

/// Threads an ordered item list into a linked hash chain.
///
/// Fails before any hashing work if the item count exceeds `max_items`.
pub fn build_hash_chain(
    inputs: &[ChainInput<'_>],
    version: ProofVersion,
    max_items: usize,
) -> Result<Vec<HashChainLink>, SealError> {
    if inputs.is_empty() {
        return Err(SealError::EmptyItems);
    }
    if inputs.len() > max_items {
        return Err(SealError::TooManyItems {
            count: inputs.len(),
            max: max_items,
        });
    }

    let mut chain = Vec::with_capacity(inputs.len());
    let mut previous_hash = GENESIS_PREVIOUS_HASH.to_string();
    for (index, input) in inputs.iter().enumerate() {
        let sequence = index as u64;
        let item_hash = content_hash(input.content);
        let link_hash = chain_link_hash(
            version,
            sequence,
            input.item_id,
            input.content_type,
            item_hash.as_str(),
            &previous_hash,
        );
        let link = HashChainLink {
            sequence,
            item_id: Some(input.item_id.to_string()),
            content_type: Some(input.content_type.to_string()),
            content_hash: item_hash,
            previous_hash: previous_hash.clone(),
            chain_hash: link_hash,
        };
        previous_hash = link.chain_hash.clone();
        chain.push(link);
    }
    Ok(chain)
}

/// Collapses a chain into one summary digest.
///
/// Feeds every link's chain-hash string, in order, into a single running
/// SHA-256 digest. Streaming keeps memory O(1) in chain length; an empty
/// chain is invalid input, not a zero hash.
pub fn compute_root_hash(chain: &[HashChainLink]) -> Result<String, ChainError> {
    if chain.is_empty() {
        return Err(ChainError::EmptyChain);
    }
    let mut hasher = Sha256::new();
    for link in chain {
        hasher.update(link.chain_hash.as_bytes());
    }
    Ok(format!(
        "{}{}",
        sealchain_canonical::HASH_PREFIX,
        hex::encode(hasher.finalize())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn inputs<'a>(contents: &'a [(&'a str, &'a str, Value)]) -> Vec<ChainInput<'a>> {
        contents
            .iter()
            .map(|&(id, ty, ref content)| ChainInput {
                item_id: id,
                content_type: ty,
                content,
            })
            .collect()
    }

    #[test]
    fn chain_links_thread_previous_hashes() {
        let contents = [
            ("i1", "test/a", json!({"val": 1})),
            ("i2", "test/b", json!({"val": 2})),
            ("i3", "test/c", json!({"val": 3})),
        ];
        let chain =
            build_hash_chain(&inputs(&contents), ProofVersion::Current, MAX_CHAIN_ITEMS).unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[0].previous_hash, GENESIS_PREVIOUS_HASH);
        for i in 1..chain.len() {
            assert_eq!(chain[i].previous_hash, chain[i - 1].chain_hash);
            assert_eq!(chain[i].sequence, i as u64);
        }
    }

    #[test]
    fn chain_hash_binds_item_identity_in_current_format() {
        let a = chain_link_hash(ProofVersion::Current, 0, "i1", "t", "sha256:aa", "genesis");
        let b = chain_link_hash(ProofVersion::Current, 0, "i2", "t", "sha256:aa", "genesis");
        assert_ne!(a, b);

        // Legacy format drops identity binding entirely.
        let la = chain_link_hash(ProofVersion::Legacy, 0, "i1", "t", "sha256:aa", "genesis");
        let lb = chain_link_hash(ProofVersion::Legacy, 0, "i2", "u", "sha256:aa", "genesis");
        assert_eq!(la, lb);
    }

    #[test]
    fn ceiling_rejects_oversized_input() {
        let content = json!({"v": 1});
        let contents: Vec<(&str, &str, Value)> =
            (0..3).map(|_| ("id", "ty", content.clone())).collect();
        let err = build_hash_chain(&inputs(&contents), ProofVersion::Current, 2).unwrap_err();
        assert!(matches!(err, SealError::TooManyItems { count: 3, max: 2 }));
    }

    #[test]
    fn empty_chain_root_is_an_error() {
        assert!(matches!(compute_root_hash(&[]), Err(ChainError::EmptyChain)));
    }

    #[test]
    fn root_hash_changes_with_link_order() {
        let contents = [
            ("i1", "t", json!(1)),
            ("i2", "t", json!(2)),
        ];
        let chain =
            build_hash_chain(&inputs(&contents), ProofVersion::Current, MAX_CHAIN_ITEMS).unwrap();
        let root = compute_root_hash(&chain).unwrap();

        let mut reversed = chain.clone();
        reversed.reverse();
        assert_ne!(root, compute_root_hash(&reversed).unwrap());
    }
}
