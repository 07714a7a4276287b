//! Error taxonomy for sealing and verification.
//!
//! Sealing failures are raised immediately (a malformed seal would be
//! silently useless). Verification findings are values, never errors: the
//! verifier accumulates every fault it detects and returns them in one
//! report.

use serde::Serialize;
use thiserror::Error;

/// Closed enumeration of stable fault codes.
///
/// These strings are a wire-format contract shared with other
/// implementations; auditing tooling matches on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FaultCode {
    /// A required top-level bundle field is absent.
    MissingRequiredField,
    /// The bundle version is not in the accepted set.
    UnsupportedVersion,
    /// Input was structurally invalid (sealing precondition or
    /// undeserializable verification input).
    InputValidationFailed,
    /// Item count exceeds the chain ceiling.
    InputTooLarge,
    /// A stored content hash or item/link binding does not match.
    ContentHashMismatch,
    /// A chain link's previous hash or recomputed chain hash diverges.
    HashChainBroken,
    /// The recomputed root hash does not match the stored value.
    RootHashMismatch,
    /// A sequence number does not equal its position.
    SequenceGap,
    /// Item count and chain length differ.
    LengthMismatch,
    /// A signature failed resolution, parsing, or verification.
    SignatureInvalid,
}

impl FaultCode {
    /// Returns the stable wire code.
    pub fn as_str(self) -> &'static str {
        match self {
            FaultCode::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            FaultCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            FaultCode::InputValidationFailed => "INPUT_VALIDATION_FAILED",
            FaultCode::InputTooLarge => "INPUT_TOO_LARGE",
            FaultCode::ContentHashMismatch => "CONTENT_HASH_MISMATCH",
            FaultCode::HashChainBroken => "HASH_CHAIN_BROKEN",
            FaultCode::RootHashMismatch => "ROOT_HASH_MISMATCH",
            FaultCode::SequenceGap => "SEQUENCE_GAP",
            FaultCode::LengthMismatch => "LENGTH_MISMATCH",
            FaultCode::SignatureInvalid => "SIGNATURE_INVALID",
        }
    }
}

impl std::fmt::Display for FaultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while building a chain or computing a root.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Root hashes over empty chains are invalid, not zero-valued.
    #[error("cannot compute a root hash over an empty chain")]
    EmptyChain,
}

/// Fail-fast errors raised by the sealer.
#[derive(Debug, Error)]
pub enum SealError {
    /// The item list was empty.
    #[error("cannot seal an empty item list")]
    EmptyItems,
    /// An item carried an empty identifier or content type.
    #[error("item {index}: {field} must be a non-empty string")]
    MissingItemField {
        /// Index of the offending item.
        index: usize,
        /// Name of the empty field.
        field: &'static str,
    },
    /// The item list exceeded the chain ceiling.
    #[error("item count {count} exceeds the chain ceiling of {max}")]
    TooManyItems {
        /// Number of items supplied.
        count: usize,
        /// Configured ceiling.
        max: usize,
    },
    /// Chain construction failed.
    #[error(transparent)]
    Chain(#[from] ChainError),
}

impl SealError {
    /// Returns the taxonomy code for this error.
    pub fn code(&self) -> FaultCode {
        match self {
            SealError::EmptyItems | SealError::MissingItemField { .. } => {
                FaultCode::InputValidationFailed
            }
            SealError::TooManyItems { .. } => FaultCode::InputTooLarge,
            SealError::Chain(_) => FaultCode::InputValidationFailed,
        }
    }
}

/// A single verification finding.
///
/// Each variant carries the structured detail (expected vs. actual values,
/// offending index or field) needed to reconstruct the fault during audit.
/// Faults are accumulated into a report, never thrown.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationFault {
    /// A required top-level bundle field is absent.
    #[error("required field '{field}' is missing")]
    MissingRequiredField {
        /// Name of the absent field.
        field: String,
    },
    /// The bundle version is not accepted.
    #[error("bundle version '{version}' is not supported")]
    UnsupportedVersion {
        /// The rejected version string.
        version: String,
    },
    /// A portion of the bundle could not be interpreted.
    #[error("invalid input at {path}: {reason}")]
    InputValidationFailed {
        /// JSON path of the offending value.
        path: String,
        /// Why it could not be interpreted.
        reason: String,
    },
    /// A stored hash or item/link binding diverges from the recomputed or
    /// corresponding value.
    #[error("item {index} ('{item_id}'): {field} mismatch (expected {expected}, actual {actual})")]
    ContentHashMismatch {
        /// Index of the offending item.
        index: usize,
        /// Identifier of the offending item.
        item_id: String,
        /// Field whose binding diverged.
        field: String,
        /// Value stored in the bundle.
        expected: String,
        /// Value recomputed or found at the corresponding position.
        actual: String,
    },
    /// A chain link's previous-hash linkage or recomputed chain hash is
    /// broken.
    #[error("chain link {sequence}: {reason} (expected {expected}, actual {actual})")]
    HashChainBroken {
        /// Sequence of the offending link.
        sequence: u64,
        /// Which linkage check failed.
        reason: String,
        /// Value the check required.
        expected: String,
        /// Value found in the bundle.
        actual: String,
    },
    /// The recomputed root hash does not match the stored value.
    #[error("root hash mismatch (expected {expected}, actual {actual})")]
    RootHashMismatch {
        /// Root hash stored in the proof.
        expected: String,
        /// Root hash recomputed from the chain.
        actual: String,
    },
    /// A sequence number does not equal its position.
    #[error("{context} at index {index} carries sequence {sequence}")]
    SequenceGap {
        /// Position in the owning list.
        index: usize,
        /// Sequence number found there.
        sequence: u64,
        /// Whether the item list or the chain diverged.
        context: String,
    },
    /// Item count and chain length differ.
    #[error("bundle has {items} items but a chain of length {chain}")]
    LengthMismatch {
        /// Number of items in the bundle.
        items: usize,
        /// Number of links in the chain.
        chain: usize,
    },
    /// A signature could not be resolved, parsed, or verified.
    #[error("signature '{signature_id}' is invalid: {reason}")]
    SignatureInvalid {
        /// Identifier of the offending signature.
        signature_id: String,
        /// Why verification failed.
        reason: String,
    },
}

impl VerificationFault {
    /// Returns the taxonomy code for this fault.
    pub fn code(&self) -> FaultCode {
        match self {
            VerificationFault::MissingRequiredField { .. } => FaultCode::MissingRequiredField,
            VerificationFault::UnsupportedVersion { .. } => FaultCode::UnsupportedVersion,
            VerificationFault::InputValidationFailed { .. } => FaultCode::InputValidationFailed,
            VerificationFault::ContentHashMismatch { .. } => FaultCode::ContentHashMismatch,
            VerificationFault::HashChainBroken { .. } => FaultCode::HashChainBroken,
            VerificationFault::RootHashMismatch { .. } => FaultCode::RootHashMismatch,
            VerificationFault::SequenceGap { .. } => FaultCode::SequenceGap,
            VerificationFault::LengthMismatch { .. } => FaultCode::LengthMismatch,
            VerificationFault::SignatureInvalid { .. } => FaultCode::SignatureInvalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_codes_serialize_to_wire_strings() {
        let code = serde_json::to_string(&FaultCode::ContentHashMismatch).unwrap();
        assert_eq!(code, r#""CONTENT_HASH_MISMATCH""#);
        assert_eq!(FaultCode::SequenceGap.as_str(), "SEQUENCE_GAP");
    }

    #[test]
    fn fault_serialization_carries_code_tag_and_detail() {
        let fault = VerificationFault::LengthMismatch { items: 3, chain: 2 };
        let value = serde_json::to_value(&fault).unwrap();
        assert_eq!(value["code"], "LENGTH_MISMATCH");
        assert_eq!(value["items"], 3);
        assert_eq!(value["chain"], 2);
    }

    #[test]
    fn seal_errors_map_to_taxonomy_codes() {
        assert_eq!(SealError::EmptyItems.code(), FaultCode::InputValidationFailed);
        assert_eq!(
            SealError::TooManyItems { count: 10_001, max: 10_000 }.code(),
            FaultCode::InputTooLarge
        );
    }
}
