//! Key material.

use std::fmt;

use k256::ecdsa::VerifyingKey;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::curve::{derive_public_key, validate_private_key};
use crate::errors::CryptoError;
use crate::hex::{bytes_to_hex, hex_to_array, to_prefixed_hex};

/// Private key length in bytes.
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Uncompressed public key length in bytes (`0x04 || x || y`).
pub const PUBLIC_KEY_LENGTH: usize = 65;

/// SEC1 tag for an uncompressed point.
const UNCOMPRESSED_TAG: u8 = 0x04;

/// secp256k1 private scalar `d` with `1 <= d <= n-1`.
///
/// Cleared from memory on drop. Not `Clone`: a key belongs to exactly one
/// signer.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; PRIVATE_KEY_LENGTH]);

impl PrivateKey {
    /// Build from big-endian bytes, rejecting `0` and values `>= n`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; PRIVATE_KEY_LENGTH] =
            bytes.try_into().map_err(|_| CryptoError::InvalidLength {
                what: "private key",
                expected: PRIVATE_KEY_LENGTH,
                actual: bytes.len(),
            })?;
        validate_private_key(&array)?;
        Ok(Self(array))
    }

    /// Parse 64 hex characters with an optional `0x` prefix.
    pub fn from_hex(value: &str) -> Result<Self, CryptoError> {
        let mut array = hex_to_array::<PRIVATE_KEY_LENGTH>(value, "private key")?;
        let result = validate_private_key(&array).map(|()| Self(array));
        array.zeroize();
        result
    }

    /// Draw a fresh key from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let mut candidate = [0u8; PRIVATE_KEY_LENGTH];
            rng.fill_bytes(&mut candidate);
            if validate_private_key(&candidate).is_ok() {
                return Self(candidate);
            }
        }
    }

    /// Raw big-endian bytes.
    pub fn as_bytes(&self) -> &[u8; PRIVATE_KEY_LENGTH] {
        &self.0
    }

    /// Lowercase hex without prefix, for provisioning output only.
    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.0)
    }

    /// Derive `d * G`.
    pub fn public_key(&self) -> Result<PublicKey, CryptoError> {
        derive_public_key(&self.0)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// Uncompressed secp256k1 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; PUBLIC_KEY_LENGTH]);

impl PublicKey {
    /// Wrap bytes already known to encode a curve point.
    pub(crate) fn from_array(bytes: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parse 65 uncompressed bytes and check the point is on the curve.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; PUBLIC_KEY_LENGTH] =
            bytes.try_into().map_err(|_| CryptoError::InvalidLength {
                what: "public key",
                expected: PUBLIC_KEY_LENGTH,
                actual: bytes.len(),
            })?;
        if array[0] != UNCOMPRESSED_TAG {
            return Err(CryptoError::InvalidPublicKey);
        }
        VerifyingKey::from_sec1_bytes(&array).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(array))
    }

    /// Parse 130 hex characters with an optional `0x` prefix.
    pub fn from_hex(value: &str) -> Result<Self, CryptoError> {
        let array = hex_to_array::<PUBLIC_KEY_LENGTH>(value, "public key")?;
        Self::from_bytes(&array)
    }

    /// Raw encoded bytes.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.0
    }

    /// Lowercase hex without prefix.
    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.0)
    }

    /// Lowercase hex with `0x` prefix, as sent on the wire.
    pub fn to_prefixed_hex(&self) -> String {
        to_prefixed_hex(&self.0)
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_prefixed_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_prefixed_hex())
    }
}
