//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Hex string could not be decoded
    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),

    /// Input has the wrong length
    #[error("invalid {what} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// What was being parsed
        what: &'static str,
        /// Expected length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },

    /// Private key is zero or not below the curve order
    #[error("private key must be in range [1, n-1]")]
    PrivateKeyOutOfRange,

    /// Public key does not decode to a point on secp256k1
    #[error("invalid public key")]
    InvalidPublicKey,

    /// The underlying ECDSA primitive failed
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// Neither recovery id reproduced the signer's public key
    #[error("could not determine recovery id")]
    RecoveryIdNotFound,
}
