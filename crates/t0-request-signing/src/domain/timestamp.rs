//! # Timestamp Codec
//!
//! Signed 64-bit milliseconds since the Unix epoch, encoded as 8 bytes
//! little-endian (two's complement for negative values). The encoded bytes
//! are appended to the payload before hashing.

use std::num::ParseIntError;

/// Encoded timestamp length in bytes.
pub const TIMESTAMP_LENGTH: usize = 8;

/// Encode as 8 little-endian bytes.
pub fn encode_timestamp(timestamp_ms: i64) -> [u8; TIMESTAMP_LENGTH] {
    timestamp_ms.to_le_bytes()
}

/// Decode 8 little-endian bytes. `None` for any other length.
pub fn decode_timestamp(bytes: &[u8]) -> Option<i64> {
    let array: [u8; TIMESTAMP_LENGTH] = bytes.try_into().ok()?;
    Some(i64::from_le_bytes(array))
}

/// Parse the decimal header form.
pub fn parse_timestamp(value: &str) -> Result<i64, ParseIntError> {
    value.parse::<i64>()
}

/// `|now_ms - timestamp_ms| <= window_ms`. The boundary is inside the window.
///
/// Computed in 128 bits so extreme inputs cannot overflow.
pub fn is_within_window(now_ms: i64, timestamp_ms: i64, window_ms: u64) -> bool {
    let diff = (i128::from(now_ms) - i128::from(timestamp_ms)).unsigned_abs();
    diff <= u128::from(window_ms)
}
