//! Signature verification and production over sealed bundles.
//!
//! The signed message is always the canonical serialization of the bundle
//! document with its `signatures` member excluded. Verification dispatches
//! on the algorithm named in each signature; every resolution, parsing, or
//! verification failure is reported as a `SIGNATURE_INVALID` fault naming
//! the signature id; nothing escapes this boundary.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ed25519_dalek::pkcs8::DecodePublicKey;
use ed25519_dalek::{Signer, Verifier};
use hmac::{Hmac, Mac};
use sealchain_canonical::canonical_bytes;
use serde_json::Value;
use sha2::Sha256;
use thiserror::Error;

use crate::bundle::{BundleSignature, EvidenceBundle, SignatureAlgorithm};
use crate::errors::VerificationFault;

type HmacSha256 = Hmac<Sha256>;

/// Key material supplied by the caller: key identifier to PEM text or raw
/// base64 public key. The core never reads keys from disk or environment.
pub type KeyMap = BTreeMap<String, String>;

/// Key identifier used when a signature names no `public_key_id`.
pub const DEFAULT_KEY_ID: &str = "default";

/// Canonical bytes a bundle signature covers: the document with its
/// `signatures` member removed.
pub fn signable_bytes(doc: &Value) -> Vec<u8> {
    let mut doc = doc.clone();
    if let Value::Object(map) = &mut doc {
        map.remove("signatures");
    }
    canonical_bytes(&doc)
}

/// Verifies every signature over the bundle document.
///
/// No signatures is vacuous success: signatures are optional and not
/// required for base integrity. Returns one fault per failing signature.
pub fn verify_signatures(
    doc: &Value,
    signatures: &[BundleSignature],
    keys: &KeyMap,
    hmac_secret: Option<&str>,
) -> Vec<VerificationFault> {
    if signatures.is_empty() {
        return Vec::new();
    }
    let message = signable_bytes(doc);
    let mut faults = Vec::new();
    for signature in signatures {
        if let Err(reason) = verify_one(&message, signature, keys, hmac_secret) {
            faults.push(VerificationFault::SignatureInvalid {
                signature_id: signature.signature_id.clone(),
                reason,
            });
        }
    }
    faults
}

fn verify_one(
    message: &[u8],
    signature: &BundleSignature,
    keys: &KeyMap,
    hmac_secret: Option<&str>,
) -> Result<(), String> {
    let raw = BASE64
        .decode(&signature.signature_value)
        .map_err(|e| format!("signature value is not base64: {e}"))?;

    match signature.algorithm {
        SignatureAlgorithm::HmacSha256 => {
            let secret = hmac_secret.ok_or("no HMAC secret supplied")?;
            let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
                .map_err(|e| format!("invalid HMAC secret: {e}"))?;
            mac.update(message);
            // verify_slice is constant-time over the tag bytes.
            mac.verify_slice(&raw)
                .map_err(|_| "HMAC does not match".to_string())
        }
        SignatureAlgorithm::Ed25519 => {
            let key = resolve_key(signature, keys)?;
            let verifying_key = ed25519_verifying_key(key)?;
            let sig = ed25519_dalek::Signature::from_slice(&raw)
                .map_err(|e| format!("malformed ed25519 signature: {e}"))?;
            verifying_key
                .verify(message, &sig)
                .map_err(|_| "ed25519 verification failed".to_string())
        }
        SignatureAlgorithm::RsaSha256 => {
            let key = resolve_key(signature, keys)?;
            let verifying_key = rsa_verifying_key(key)?;
            let sig = rsa::pkcs1v15::Signature::try_from(raw.as_slice())
                .map_err(|e| format!("malformed rsa signature: {e}"))?;
            verifying_key
                .verify(message, &sig)
                .map_err(|_| "rsa-sha256 verification failed".to_string())
        }
        SignatureAlgorithm::EcdsaP256 => {
            let key = resolve_key(signature, keys)?;
            let verifying_key = p256_verifying_key(key)?;
            let sig = ecdsa_signature(&raw)?;
            verifying_key
                .verify(message, &sig)
                .map_err(|_| "ecdsa-p256 verification failed".to_string())
        }
    }
}

fn resolve_key<'a>(signature: &BundleSignature, keys: &'a KeyMap) -> Result<&'a str, String> {
    let key_id = signature.public_key_id.as_deref().unwrap_or(DEFAULT_KEY_ID);
    keys.get(key_id)
        .map(String::as_str)
        .ok_or_else(|| format!("no public key for id '{key_id}'"))
}

fn is_pem(text: &str) -> bool {
    text.trim_start().starts_with("-----BEGIN")
}

/// Accepts PEM (SPKI) text or a raw base64 32-byte key. Raw keys are fed
/// straight into the key type, which supplies the minimal encoding header.
fn ed25519_verifying_key(text: &str) -> Result<ed25519_dalek::VerifyingKey, String> {
    if is_pem(text) {
        return ed25519_dalek::VerifyingKey::from_public_key_pem(text)
            .map_err(|e| format!("invalid ed25519 public key PEM: {e}"));
    }
    let raw = BASE64
        .decode(text.trim())
        .map_err(|e| format!("ed25519 public key is not base64: {e}"))?;
    let bytes: [u8; 32] = raw
        .as_slice()
        .try_into()
        .map_err(|_| format!("ed25519 public key must be 32 bytes, got {}", raw.len()))?;
    ed25519_dalek::VerifyingKey::from_bytes(&bytes)
        .map_err(|e| format!("invalid ed25519 public key: {e}"))
}

fn rsa_verifying_key(text: &str) -> Result<rsa::pkcs1v15::VerifyingKey<Sha256>, String> {
    if !is_pem(text) {
        return Err("rsa public keys must be PEM encoded".to_string());
    }
    let public_key = rsa::RsaPublicKey::from_public_key_pem(text)
        .or_else(|_| {
            use rsa::pkcs1::DecodeRsaPublicKey;
            rsa::RsaPublicKey::from_pkcs1_pem(text)
        })
        .map_err(|e| format!("invalid rsa public key PEM: {e}"))?;
    Ok(rsa::pkcs1v15::VerifyingKey::<Sha256>::new(public_key))
}

fn p256_verifying_key(text: &str) -> Result<p256::ecdsa::VerifyingKey, String> {
    if is_pem(text) {
        return p256::ecdsa::VerifyingKey::from_public_key_pem(text)
            .map_err(|e| format!("invalid ecdsa-p256 public key PEM: {e}"));
    }
    let raw = BASE64
        .decode(text.trim())
        .map_err(|e| format!("ecdsa-p256 public key is not base64: {e}"))?;
    p256::ecdsa::VerifyingKey::from_sec1_bytes(&raw)
        .map_err(|e| format!("invalid ecdsa-p256 public key: {e}"))
}

/// Accepts DER or raw 64-byte (r || s) ECDSA signatures.
fn ecdsa_signature(raw: &[u8]) -> Result<p256::ecdsa::Signature, String> {
    p256::ecdsa::Signature::from_der(raw)
        .or_else(|_| p256::ecdsa::Signature::from_slice(raw))
        .map_err(|e| format!("malformed ecdsa-p256 signature: {e}"))
}

/// Errors raised while producing a signature.
#[derive(Debug, Error)]
pub enum SignError {
    /// The bundle could not be rendered as a JSON document.
    #[error("bundle serialization failed: {0}")]
    Serialization(String),
}

/// Descriptive fields for a signature being produced.
#[derive(Debug, Clone)]
pub struct SignatureRequest {
    /// Identifier for the new signature.
    pub signature_id: String,
    /// Identifier of the signer.
    pub signer_id: String,
    /// Signing timestamp (RFC3339), supplied by the caller.
    pub signed_at: String,
    /// Key identifier verifiers should resolve, if not the default key.
    pub public_key_id: Option<String>,
}

/// Produces bundle signatures for the deterministic algorithms.
///
/// RSA signing is deliberately absent: key generation and padding policy
/// belong to external tooling, and the verifier still accepts `rsa-sha256`.
pub enum BundleSigner {
    /// Ed25519 signing key.
    Ed25519(ed25519_dalek::SigningKey),
    /// ECDSA/P-256 signing key (RFC 6979 deterministic nonces).
    EcdsaP256(p256::ecdsa::SigningKey),
    /// HMAC-SHA256 shared secret.
    HmacSha256(String),
}

impl BundleSigner {
    /// The algorithm this signer produces.
    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            BundleSigner::Ed25519(_) => SignatureAlgorithm::Ed25519,
            BundleSigner::EcdsaP256(_) => SignatureAlgorithm::EcdsaP256,
            BundleSigner::HmacSha256(_) => SignatureAlgorithm::HmacSha256,
        }
    }

    /// Signs the canonical bundle bytes (with `signatures` excluded) and
    /// returns the attestation to attach.
    pub fn sign(
        &self,
        bundle: &EvidenceBundle,
        request: SignatureRequest,
    ) -> Result<BundleSignature, SignError> {
        let doc = serde_json::to_value(bundle).map_err(|e| SignError::Serialization(e.to_string()))?;
        let message = signable_bytes(&doc);
        let signature_value = match self {
            BundleSigner::Ed25519(signing_key) => {
                BASE64.encode(signing_key.sign(&message).to_bytes())
            }
            BundleSigner::EcdsaP256(signing_key) => {
                let sig: p256::ecdsa::Signature = signing_key.sign(&message);
                BASE64.encode(sig.to_der().as_bytes())
            }
            BundleSigner::HmacSha256(secret) => {
                let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
                    .expect("HMAC accepts keys of any length");
                mac.update(&message);
                BASE64.encode(mac.finalize().into_bytes())
            }
        };
        Ok(BundleSignature {
            signature_id: request.signature_id,
            algorithm: self.algorithm(),
            signer_id: request.signer_id,
            signature_value,
            signed_at: request.signed_at,
            public_key_id: request.public_key_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signable_bytes_exclude_signatures_member() {
        let with = json!({"bundle_id": "b", "signatures": [{"signature_id": "s1"}]});
        let without = json!({"bundle_id": "b"});
        assert_eq!(signable_bytes(&with), signable_bytes(&without));
    }

    #[test]
    fn no_signatures_is_vacuous_success() {
        let doc = json!({"bundle_id": "b"});
        let faults = verify_signatures(&doc, &[], &KeyMap::new(), None);
        assert!(faults.is_empty());
    }

    #[test]
    fn unresolvable_key_becomes_a_fault_not_a_panic() {
        let doc = json!({"bundle_id": "b"});
        let signature = BundleSignature {
            signature_id: "sig-1".to_string(),
            algorithm: SignatureAlgorithm::Ed25519,
            signer_id: "signer".to_string(),
            signature_value: BASE64.encode([0u8; 64]),
            signed_at: "2024-01-01T00:00:00Z".to_string(),
            public_key_id: Some("missing".to_string()),
        };
        let faults = verify_signatures(&doc, &[signature], &KeyMap::new(), None);
        assert_eq!(faults.len(), 1);
        assert!(matches!(
            &faults[0],
            VerificationFault::SignatureInvalid { signature_id, .. } if signature_id == "sig-1"
        ));
    }
}
