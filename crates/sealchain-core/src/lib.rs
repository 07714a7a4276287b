//! Sealing and offline verification of tamper-evident evidence bundles.
//!
//! This crate provides:
//! - The bundle data model (items, chain links, immutability proof,
//!   signatures)
//! - Hash-chain construction and root aggregation over canonical content
//!   hashes
//! - The sealer, which turns an ordered item list into a sealed bundle
//! - The verifier, which recomputes everything offline and returns a
//!   multi-fault report
//! - Signature verification (`ed25519`, `rsa-sha256`, `ecdsa-p256`,
//!   `hmac-sha256`) against caller-supplied key material
//!
//! Core invariants:
//! - Sealed entities are immutable; mutation breaks the chain by design
//! - Every operation is a pure function of its inputs: no I/O, no clock,
//!   no shared state between calls
//! - Hash and MAC comparisons are constant-time
//! - Verification accumulates faults; it never stops at the first one
//!
#![deny(missing_docs)]

/// Bundle data model and persisted document shape.
pub mod bundle;
/// Hash-chain construction and root aggregation.
pub mod chain;
/// Constant-time comparison helpers.
pub mod compare;
/// Error taxonomy shared by sealing and verification.
pub mod errors;
/// Bundle sealing.
pub mod seal;
/// Signature verification and production.
pub mod signatures;
/// Offline bundle verification.
pub mod verify;

pub use bundle::{
    BundleSignature, EvidenceBundle, EvidenceItem, HashChainLink, ImmutabilityProof,
    SignatureAlgorithm, CURRENT_VERSION, REQUIRED_FIELDS, SUPPORTED_VERSIONS,
};
pub use chain::{
    build_hash_chain, chain_link_hash, compute_root_hash, ChainInput, ProofVersion,
    GENESIS_PREVIOUS_HASH, MAX_CHAIN_ITEMS,
};
pub use compare::constant_time_str_eq;
pub use errors::{ChainError, FaultCode, SealError, VerificationFault};
pub use seal::{SealItem, SealRequest, Sealer};
pub use signatures::{
    signable_bytes, verify_signatures, BundleSigner, KeyMap, SignError, SignatureRequest,
    DEFAULT_KEY_ID,
};
pub use verify::{VerificationReport, Verifier, VerifyOptions};
