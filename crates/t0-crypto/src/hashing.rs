//! # Keccak-256 Hashing
//!
//! Legacy (pre-NIST) Keccak-256, the variant Ethereum uses.
//!
//! SHA3-256 pads with domain byte `0x06`; Keccak-256 pads with `0x01`. The two
//! produce different digests for the same input, so `sha3::Sha3_256` must
//! never stand in for [`keccak256`].

use sha3::{Digest as _, Keccak256};

/// Keccak-256 output (256-bit).
pub type Digest = [u8; 32];

/// Length of a Keccak-256 digest in bytes.
pub const DIGEST_LENGTH: usize = 32;

/// Streaming Keccak-256 hasher.
///
/// Every instance owns its own sponge state, so independent hashers may be
/// used from any number of threads.
#[derive(Clone, Default)]
pub struct Keccak256Hasher {
    inner: Keccak256,
}

impl Keccak256Hasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Keccak256::new(),
        }
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return hash.
    pub fn finalize(self) -> Digest {
        self.inner.finalize().into()
    }
}

/// Hash data with Keccak-256 (one-shot).
pub fn keccak256(data: &[u8]) -> Digest {
    Keccak256::digest(data).into()
}

/// Hash the logical concatenation of `parts` without building the joined
/// buffer. Empty parts contribute nothing.
pub fn keccak256_concat<I, P>(parts: I) -> Digest
where
    I: IntoIterator<Item = P>,
    P: AsRef<[u8]>,
{
    let mut hasher = Keccak256Hasher::new();
    for part in parts {
        hasher.update(part.as_ref());
    }
    hasher.finalize()
}
