//! Offline bundle verification.
//!
//! The verifier recomputes everything the sealer produced and diffs it
//! against the stored values. It never mutates input and never stops at the
//! first fault: every stage runs even when an earlier stage reported
//! findings, so one call surfaces the complete diagnosis. The only
//! short-circuits are a bundle that is not an object and a bundle missing
//! its items or proof entirely, where there is nothing left to check.

use serde_json::Value;

use crate::bundle::{
    BundleSignature, EvidenceBundle, EvidenceItem, HashChainLink, ImmutabilityProof,
    REQUIRED_FIELDS, SUPPORTED_VERSIONS,
};
use crate::chain::{chain_link_hash, compute_root_hash, ProofVersion, GENESIS_PREVIOUS_HASH};
use crate::compare::constant_time_str_eq;
use crate::errors::VerificationFault;
use crate::signatures::{verify_signatures, KeyMap};
use sealchain_canonical::content_hash;

/// Caller-controlled verification policy and key material.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Bundle versions to accept.
    pub accepted_versions: Vec<String>,
    /// Whether to accept the deprecated legacy chain-hash format. Off by
    /// default; accepting it drops item-identity binding and is surfaced as
    /// a compatibility warning on every affected link.
    pub accept_legacy_chain: bool,
    /// Public keys by identifier (PEM text or raw base64).
    pub keys: KeyMap,
    /// Shared secret for `hmac-sha256` signatures.
    pub hmac_secret: Option<String>,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            accepted_versions: SUPPORTED_VERSIONS.iter().map(|v| v.to_string()).collect(),
            accept_legacy_chain: false,
            keys: KeyMap::new(),
            hmac_secret: None,
        }
    }
}

/// Outcome of one verification pass.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationReport {
    /// True when no faults were found.
    pub valid: bool,
    /// Every fault detected, across all stages.
    pub faults: Vec<VerificationFault>,
    /// Non-fatal findings, e.g. legacy chain acceptance.
    pub warnings: Vec<String>,
}

impl VerificationReport {
    fn from_parts(faults: Vec<VerificationFault>, warnings: Vec<String>) -> Self {
        Self {
            valid: faults.is_empty(),
            faults,
            warnings,
        }
    }

    /// True if any fault carries the given taxonomy code.
    pub fn has_code(&self, code: crate::errors::FaultCode) -> bool {
        self.faults.iter().any(|f| f.code() == code)
    }
}

/// Recomputes and cross-checks a sealed bundle.
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    options: VerifyOptions,
}

impl Verifier {
    /// Creates a verifier with the given policy.
    pub fn new(options: VerifyOptions) -> Self {
        Self { options }
    }

    /// Verifies a bundle document as loaded from storage.
    ///
    /// Stages, all of which run unless a short-circuit applies: required
    /// fields, version allow-list, content hashes, hash chain, root hash,
    /// item/chain cross-checks, signatures.
    pub fn verify_bundle(&self, doc: &Value) -> VerificationReport {
        let mut faults = Vec::new();
        let mut warnings = Vec::new();

        let Some(object) = doc.as_object() else {
            faults.push(VerificationFault::InputValidationFailed {
                path: "(root)".to_string(),
                reason: "bundle is not a JSON object".to_string(),
            });
            return VerificationReport::from_parts(faults, warnings);
        };

        for field in REQUIRED_FIELDS {
            if object.get(field).map_or(true, Value::is_null) {
                faults.push(VerificationFault::MissingRequiredField {
                    field: field.to_string(),
                });
            }
        }

        if let Some(version) = object.get("version").filter(|v| !v.is_null()) {
            let accepted = version
                .as_str()
                .is_some_and(|v| self.options.accepted_versions.iter().any(|a| a == v));
            if !accepted {
                faults.push(VerificationFault::UnsupportedVersion {
                    version: version.as_str().map_or_else(|| version.to_string(), String::from),
                });
            }
        }

        // Nothing left to check without items or a proof.
        let items_value = object.get("items").filter(|v| !v.is_null());
        let proof_value = object.get("immutability_proof").filter(|v| !v.is_null());
        let (Some(items_value), Some(proof_value)) = (items_value, proof_value) else {
            return VerificationReport::from_parts(faults, warnings);
        };

        let items: Option<Vec<EvidenceItem>> = match serde_json::from_value(items_value.clone()) {
            Ok(items) => Some(items),
            Err(e) => {
                faults.push(VerificationFault::InputValidationFailed {
                    path: "items".to_string(),
                    reason: e.to_string(),
                });
                None
            }
        };
        let proof: Option<ImmutabilityProof> = match serde_json::from_value(proof_value.clone()) {
            Ok(proof) => Some(proof),
            Err(e) => {
                faults.push(VerificationFault::InputValidationFailed {
                    path: "immutability_proof".to_string(),
                    reason: e.to_string(),
                });
                None
            }
        };

        if let Some(items) = &items {
            faults.extend(self.verify_content_hashes(items));
        }
        if let Some(proof) = &proof {
            let (chain_faults, chain_warnings) = self.verify_hash_chain(&proof.hash_chain);
            faults.extend(chain_faults);
            warnings.extend(chain_warnings);
            faults.extend(self.verify_root_hash(proof));
        }
        if let (Some(items), Some(proof)) = (&items, &proof) {
            if items.len() != proof.hash_chain.len() {
                faults.push(VerificationFault::LengthMismatch {
                    items: items.len(),
                    chain: proof.hash_chain.len(),
                });
            }
            faults.extend(cross_check_items(items, &proof.hash_chain));
        }

        match object.get("signatures").filter(|v| !v.is_null()) {
            None => {}
            Some(signatures_value) => {
                match serde_json::from_value::<Vec<BundleSignature>>(signatures_value.clone()) {
                    Ok(signatures) => {
                        faults.extend(verify_signatures(
                            doc,
                            &signatures,
                            &self.options.keys,
                            self.options.hmac_secret.as_deref(),
                        ));
                    }
                    Err(e) => {
                        faults.push(VerificationFault::InputValidationFailed {
                            path: "signatures".to_string(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        VerificationReport::from_parts(faults, warnings)
    }

    /// Verifies a typed bundle by rendering it to its document form first.
    pub fn verify_sealed(&self, bundle: &EvidenceBundle) -> VerificationReport {
        match serde_json::to_value(bundle) {
            Ok(doc) => self.verify_bundle(&doc),
            Err(e) => VerificationReport::from_parts(
                vec![VerificationFault::InputValidationFailed {
                    path: "(root)".to_string(),
                    reason: e.to_string(),
                }],
                Vec::new(),
            ),
        }
    }

    /// Recomputes every item's content hash and diffs against the stored
    /// value.
    pub fn verify_content_hashes(&self, items: &[EvidenceItem]) -> Vec<VerificationFault> {
        let mut faults = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let recomputed = content_hash(&item.content);
            if !constant_time_str_eq(item.content_hash.as_str(), recomputed.as_str()) {
                faults.push(VerificationFault::ContentHashMismatch {
                    index,
                    item_id: item.item_id.clone(),
                    field: "content_hash".to_string(),
                    expected: item.content_hash.as_str().to_string(),
                    actual: recomputed.as_str().to_string(),
                });
            }
        }
        faults
    }

    /// Walks the chain: sequence numbering, previous-hash linkage, and
    /// recomputed chain hashes.
    ///
    /// The current formula is preferred whenever a link carries item
    /// identity; the legacy formula is consulted only when the caller opted
    /// in, and each acceptance emits a compatibility warning.
    pub fn verify_hash_chain(
        &self,
        chain: &[HashChainLink],
    ) -> (Vec<VerificationFault>, Vec<String>) {
        let mut faults = Vec::new();
        let mut warnings = Vec::new();

        for (index, link) in chain.iter().enumerate() {
            if link.sequence != index as u64 {
                faults.push(VerificationFault::SequenceGap {
                    index,
                    sequence: link.sequence,
                    context: "hash chain".to_string(),
                });
            }

            let expected_previous = if index == 0 {
                GENESIS_PREVIOUS_HASH
            } else {
                chain[index - 1].chain_hash.as_str()
            };
            if !constant_time_str_eq(&link.previous_hash, expected_previous) {
                faults.push(VerificationFault::HashChainBroken {
                    sequence: link.sequence,
                    reason: "previous hash does not match predecessor".to_string(),
                    expected: expected_previous.to_string(),
                    actual: link.previous_hash.clone(),
                });
            }

            match self.recompute_chain_hash(link) {
                ChainHashCheck::Current => {}
                ChainHashCheck::Legacy => {
                    warnings.push(format!(
                        "chain link {} verified with the deprecated legacy format, \
                         which does not bind item identity",
                        link.sequence
                    ));
                }
                ChainHashCheck::Mismatch { expected } => {
                    faults.push(VerificationFault::HashChainBroken {
                        sequence: link.sequence,
                        reason: "recomputed chain hash does not match".to_string(),
                        expected,
                        actual: link.chain_hash.clone(),
                    });
                }
            }
        }
        (faults, warnings)
    }

    fn recompute_chain_hash(&self, link: &HashChainLink) -> ChainHashCheck {
        let current = match (&link.item_id, &link.content_type) {
            (Some(item_id), Some(content_type)) => Some(chain_link_hash(
                ProofVersion::Current,
                link.sequence,
                item_id,
                content_type,
                link.content_hash.as_str(),
                &link.previous_hash,
            )),
            _ => None,
        };
        if let Some(current) = &current {
            if constant_time_str_eq(current, &link.chain_hash) {
                return ChainHashCheck::Current;
            }
        }

        if self.options.accept_legacy_chain {
            let legacy = chain_link_hash(
                ProofVersion::Legacy,
                link.sequence,
                "",
                "",
                link.content_hash.as_str(),
                &link.previous_hash,
            );
            if constant_time_str_eq(&legacy, &link.chain_hash) {
                return ChainHashCheck::Legacy;
            }
        }

        ChainHashCheck::Mismatch {
            expected: current.unwrap_or_else(|| {
                "(link omits item identity; legacy chains are not accepted)".to_string()
            }),
        }
    }

    /// Recomputes the root hash from the proof's chain and diffs against the
    /// stored value.
    pub fn verify_root_hash(&self, proof: &ImmutabilityProof) -> Vec<VerificationFault> {
        match compute_root_hash(&proof.hash_chain) {
            Ok(recomputed) => {
                if constant_time_str_eq(&proof.root_hash, &recomputed) {
                    Vec::new()
                } else {
                    vec![VerificationFault::RootHashMismatch {
                        expected: proof.root_hash.clone(),
                        actual: recomputed,
                    }]
                }
            }
            Err(e) => vec![VerificationFault::InputValidationFailed {
                path: "immutability_proof.hash_chain".to_string(),
                reason: e.to_string(),
            }],
        }
    }
}

enum ChainHashCheck {
    Current,
    Legacy,
    Mismatch { expected: String },
}

/// Binds each item's position, identity, and content hash to the chain link
/// at the same index.
fn cross_check_items(items: &[EvidenceItem], chain: &[HashChainLink]) -> Vec<VerificationFault> {
    let mut faults = Vec::new();
    for (index, (item, link)) in items.iter().zip(chain.iter()).enumerate() {
        if item.sequence != index as u64 {
            faults.push(VerificationFault::SequenceGap {
                index,
                sequence: item.sequence,
                context: "item list".to_string(),
            });
        }
        if !constant_time_str_eq(item.content_hash.as_str(), link.content_hash.as_str()) {
            faults.push(VerificationFault::ContentHashMismatch {
                index,
                item_id: item.item_id.clone(),
                field: "chain content_hash".to_string(),
                expected: item.content_hash.as_str().to_string(),
                actual: link.content_hash.as_str().to_string(),
            });
        }
        if let Some(link_item_id) = &link.item_id {
            if link_item_id != &item.item_id {
                faults.push(VerificationFault::ContentHashMismatch {
                    index,
                    item_id: item.item_id.clone(),
                    field: "chain item_id".to_string(),
                    expected: item.item_id.clone(),
                    actual: link_item_id.clone(),
                });
            }
        }
        if let Some(link_content_type) = &link.content_type {
            if link_content_type != &item.content_type {
                faults.push(VerificationFault::ContentHashMismatch {
                    index,
                    item_id: item.item_id.clone(),
                    field: "chain content_type".to_string(),
                    expected: item.content_type.clone(),
                    actual: link_content_type.clone(),
                });
            }
        }
    }
    faults
}
