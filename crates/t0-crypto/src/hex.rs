//! Hex codec for keys and signatures.
//!
//! Wire values carry a lowercase `0x` prefix. Parsing accepts `0x`, `0X` or no
//! prefix and is case-insensitive.

use crate::errors::CryptoError;

/// Prefix attached to every hex value this crate emits.
pub const HEX_PREFIX: &str = "0x";

/// Remove a leading `0x` / `0X`, if present.
pub fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

/// Ensure `value` starts with `0x`.
pub fn add_hex_prefix(value: &str) -> String {
    if value.starts_with("0x") || value.starts_with("0X") {
        value.to_string()
    } else {
        format!("{HEX_PREFIX}{value}")
    }
}

/// Lowercase hex without prefix.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    ::hex::encode(bytes)
}

/// Lowercase hex with `0x` prefix.
pub fn to_prefixed_hex(bytes: &[u8]) -> String {
    format!("{HEX_PREFIX}{}", ::hex::encode(bytes))
}

/// Decode hex with an optional prefix.
pub fn hex_to_bytes(value: &str) -> Result<Vec<u8>, CryptoError> {
    ::hex::decode(strip_hex_prefix(value)).map_err(|e| CryptoError::InvalidHex(e.to_string()))
}

/// Decode hex into a fixed-size array, rejecting any other length.
pub fn hex_to_array<const N: usize>(
    value: &str,
    what: &'static str,
) -> Result<[u8; N], CryptoError> {
    let bytes = hex_to_bytes(value)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| CryptoError::InvalidLength {
            what,
            expected: N,
            actual: bytes.len(),
        })
}
