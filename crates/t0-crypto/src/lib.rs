//! # T-0 Crypto - Request Signing Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Keccak-256 (legacy padding) | Request digests |
//! | `curve` | secp256k1 | Key validation, point decompression, key recovery |
//! | `keys` | secp256k1 | Private / public key material |
//! | `ecdsa` | secp256k1 ECDSA | Signing with recovery id |
//! | `verifier` | secp256k1 ECDSA | Signature verification |
//! | `hex` | - | `0x`-prefixed wire encoding |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic, low-S normalization
//! - **Keccak-256**: Ethereum-compatible, not NIST SHA3-256
//! - **Key equality**: constant-time via `subtle`
//! - **Private keys**: zeroized on drop

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod curve;
pub mod ecdsa;
pub mod errors;
pub mod hashing;
pub mod hex;
pub mod keys;
pub mod verifier;

// Re-exports
pub use ecdsa::{SignResult, Signer, COMPACT_SIGNATURE_LENGTH, SIGNATURE_LENGTH};
pub use errors::CryptoError;
pub use hashing::{keccak256, keccak256_concat, Digest, Keccak256Hasher, DIGEST_LENGTH};
pub use keys::{PrivateKey, PublicKey, PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH};
pub use verifier::{public_keys_equal, verify, EcdsaVerifier};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
