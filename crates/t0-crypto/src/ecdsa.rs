//! # ECDSA Signing (secp256k1)
//!
//! Deterministic signatures in the 65-byte `r || s || v` layout.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (HMAC-SHA256, no RNG dependency for signing)
//! - Low-S normalization: `s <= n/2` on every emitted signature
//! - Recovery id chosen by recovering the public key and comparing it with
//!   the signer's own key

use std::fmt;

use k256::ecdsa::{signature::hazmat::PrehashSigner, Signature, SigningKey};
use tracing::error;

use crate::curve::{canonicalize_s, recover_public_key};
use crate::errors::CryptoError;
use crate::hashing::DIGEST_LENGTH;
use crate::hex::to_prefixed_hex;
use crate::keys::{PrivateKey, PublicKey};

/// Signature length in bytes (`r || s || v`).
pub const SIGNATURE_LENGTH: usize = 65;

/// Signature length without the recovery byte.
pub const COMPACT_SIGNATURE_LENGTH: usize = 64;

/// A signature together with the key that produced it.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SignResult {
    signature: [u8; SIGNATURE_LENGTH],
    public_key: PublicKey,
}

impl SignResult {
    /// Full 65-byte signature.
    pub fn signature(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.signature
    }

    /// Signer's public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The `r` component.
    pub fn r(&self) -> [u8; 32] {
        let mut r = [0u8; 32];
        r.copy_from_slice(&self.signature[..32]);
        r
    }

    /// The `s` component (always low).
    pub fn s(&self) -> [u8; 32] {
        let mut s = [0u8; 32];
        s.copy_from_slice(&self.signature[32..64]);
        s
    }

    /// Recovery id, `0` or `1`.
    pub fn v(&self) -> u8 {
        self.signature[64]
    }

    /// `0x`-prefixed signature hex.
    pub fn signature_hex(&self) -> String {
        to_prefixed_hex(&self.signature)
    }

    /// `0x`-prefixed public key hex.
    pub fn public_key_hex(&self) -> String {
        self.public_key.to_prefixed_hex()
    }
}

impl fmt::Display for SignResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "signature={} public_key={}",
            self.signature_hex(),
            self.public_key_hex()
        )
    }
}

impl fmt::Debug for SignResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignResult")
            .field("signature", &self.signature_hex())
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// secp256k1 signer bound to a single private key.
///
/// Holds no mutable state; `sign` may be called concurrently from any number
/// of threads.
pub struct Signer {
    signing_key: SigningKey,
    public_key: PublicKey,
}

impl Signer {
    /// Create a signer, deriving and caching the public key.
    pub fn new(private_key: &PrivateKey) -> Result<Self, CryptoError> {
        let signing_key = SigningKey::from_bytes(private_key.as_bytes().into())
            .map_err(|_| CryptoError::PrivateKeyOutOfRange)?;
        let public_key = private_key.public_key()?;
        Ok(Self {
            signing_key,
            public_key,
        })
    }

    /// Create from 32 big-endian key bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        Self::new(&PrivateKey::from_bytes(bytes)?)
    }

    /// Create from a hex key with optional `0x` prefix.
    pub fn from_hex(value: &str) -> Result<Self, CryptoError> {
        Self::new(&PrivateKey::from_hex(value)?)
    }

    /// Create a signer with a freshly generated key.
    pub fn generate() -> Result<Self, CryptoError> {
        Self::new(&PrivateKey::generate())
    }

    /// Cached public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Public key hex without prefix.
    pub fn public_key_hex(&self) -> String {
        self.public_key.to_hex()
    }

    /// Public key hex with `0x` prefix.
    pub fn public_key_hex_prefixed(&self) -> String {
        self.public_key.to_prefixed_hex()
    }

    /// Sign a 32-byte digest.
    ///
    /// The same key and digest always yield the same signature.
    pub fn sign(&self, digest: &[u8]) -> Result<SignResult, CryptoError> {
        if digest.len() != DIGEST_LENGTH {
            return Err(CryptoError::InvalidLength {
                what: "digest",
                expected: DIGEST_LENGTH,
                actual: digest.len(),
            });
        }

        let signature: Signature = self
            .signing_key
            .sign_prehash(digest)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        let rs = signature.to_bytes();

        let mut r = [0u8; 32];
        r.copy_from_slice(&rs[..32]);
        let mut s = [0u8; 32];
        s.copy_from_slice(&rs[32..]);
        let s = canonicalize_s(&s);

        let mut digest_array = [0u8; DIGEST_LENGTH];
        digest_array.copy_from_slice(digest);

        let v = (0u8..=1)
            .find(|&v| recover_public_key(&digest_array, &r, &s, v) == Some(self.public_key))
            .ok_or_else(|| {
                error!(
                    public_key = %self.public_key,
                    "no recovery id reproduces the signer's public key"
                );
                CryptoError::RecoveryIdNotFound
            })?;

        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..32].copy_from_slice(&r);
        out[32..64].copy_from_slice(&s);
        out[64] = v;

        Ok(SignResult {
            signature: out,
            public_key: self.public_key,
        })
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}
