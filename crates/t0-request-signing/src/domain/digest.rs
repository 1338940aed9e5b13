//! Request digests.
//!
//! `Keccak256(payload || le_bytes(timestamp_ms))`, where the payload is either
//! the bare message or the message behind a 5-byte length-prefixed frame
//! (`[0x00][len: u32 big-endian]`), depending on the caller's wire framing.

use std::fmt;

use t0_crypto::{keccak256_concat, Digest, Keccak256Hasher};

use crate::domain::timestamp::encode_timestamp;

/// Frame header length: one compression flag byte and a 4-byte length.
pub const FRAME_HEADER_LENGTH: usize = 5;

/// Compression flag value for an uncompressed frame.
const UNCOMPRESSED: u8 = 0x00;

/// Which payload form a signature was produced over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingHypothesis {
    /// Payload bytes as received.
    Bare,
    /// Payload behind a 5-byte frame header.
    LengthPrefixed,
}

impl FramingHypothesis {
    /// Digest of `payload` under this hypothesis. `None` if the payload is
    /// too long to frame.
    pub fn digest(self, payload: &[u8], timestamp_ms: i64) -> Option<Digest> {
        match self {
            Self::Bare => Some(request_digest(payload, timestamp_ms)),
            Self::LengthPrefixed => framed_request_digest(payload, timestamp_ms),
        }
    }

    /// Stable lowercase name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bare => "bare",
            Self::LengthPrefixed => "length_prefixed",
        }
    }
}

impl fmt::Display for FramingHypothesis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Digest over the bare payload.
pub fn request_digest(payload: &[u8], timestamp_ms: i64) -> Digest {
    keccak256_concat([payload, &encode_timestamp(timestamp_ms)[..]])
}

/// Frame header for a payload of `len` bytes.
pub fn frame_header(len: usize) -> Option<[u8; FRAME_HEADER_LENGTH]> {
    let len = u32::try_from(len).ok()?.to_be_bytes();
    Some([UNCOMPRESSED, len[0], len[1], len[2], len[3]])
}

/// `frame_header(payload.len()) || payload`.
pub fn frame_payload(payload: &[u8]) -> Option<Vec<u8>> {
    let header = frame_header(payload.len())?;
    let mut framed = Vec::with_capacity(FRAME_HEADER_LENGTH + payload.len());
    framed.extend_from_slice(&header);
    framed.extend_from_slice(payload);
    Some(framed)
}

/// Digest over the framed payload, streamed without copying the payload.
pub fn framed_request_digest(payload: &[u8], timestamp_ms: i64) -> Option<Digest> {
    let header = frame_header(payload.len())?;
    let mut hasher = Keccak256Hasher::new();
    hasher
        .update(&header)
        .update(payload)
        .update(&encode_timestamp(timestamp_ms));
    Some(hasher.finalize())
}
