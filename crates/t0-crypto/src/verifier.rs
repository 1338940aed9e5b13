//! # ECDSA Verification (secp256k1)
//!
//! Direct `(r, s)` verification against a known public key. Any structural
//! problem yields `false`; nothing here returns an error.

use k256::ecdsa::{signature::hazmat::PrehashVerifier, Signature, VerifyingKey};
use subtle::ConstantTimeEq;

use crate::curve::{canonicalize_s, is_valid_scalar};
use crate::ecdsa::{COMPACT_SIGNATURE_LENGTH, SIGNATURE_LENGTH};
use crate::hashing::DIGEST_LENGTH;
use crate::keys::PUBLIC_KEY_LENGTH;

/// Stateless verifier. Methods delegate to the free functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcdsaVerifier;

impl EcdsaVerifier {
    /// Create new verifier.
    pub fn new() -> Self {
        Self
    }

    /// See [`verify`].
    pub fn verify(&self, public_key: &[u8], digest: &[u8], signature: &[u8]) -> bool {
        verify(public_key, digest, signature)
    }

    /// See [`public_keys_equal`].
    pub fn public_keys_equal(&self, a: Option<&[u8]>, b: Option<&[u8]>) -> bool {
        public_keys_equal(a, b)
    }
}

/// Verify a 64- or 65-byte signature over a 32-byte digest.
///
/// The recovery byte of a 65-byte signature is ignored. A high `s` is
/// normalized before checking, so both forms of an otherwise valid signature
/// are accepted.
pub fn verify(public_key: &[u8], digest: &[u8], signature: &[u8]) -> bool {
    if digest.len() != DIGEST_LENGTH
        || public_key.len() != PUBLIC_KEY_LENGTH
        || !matches!(signature.len(), COMPACT_SIGNATURE_LENGTH | SIGNATURE_LENGTH)
    {
        return false;
    }

    let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(public_key) else {
        return false;
    };

    let mut s = [0u8; 32];
    s.copy_from_slice(&signature[32..64]);
    if !is_valid_scalar(&s) {
        return false;
    }
    let mut rs = [0u8; COMPACT_SIGNATURE_LENGTH];
    rs[..32].copy_from_slice(&signature[..32]);
    rs[32..].copy_from_slice(&canonicalize_s(&s));

    let Ok(sig) = Signature::from_slice(&rs) else {
        return false;
    };

    verifying_key.verify_prehash(digest, &sig).is_ok()
}

/// Constant-time byte equality. `false` if either side is absent.
pub fn public_keys_equal(a: Option<&[u8]>, b: Option<&[u8]>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.ct_eq(b).into(),
        _ => false,
    }
}
