//! Wire headers carried by every signed request.

use http::{HeaderMap, HeaderName, HeaderValue};
use t0_crypto::SignResult;

use crate::domain::errors::SigningError;

/// Signature header: `0x` + 130 hex chars (`r || s || v`).
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Public key header: `0x` + 130 hex chars (uncompressed point).
pub const PUBLIC_KEY_HEADER: &str = "x-public-key";

/// Timestamp header: decimal milliseconds since epoch.
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

/// Default allowed clock skew between signer and verifier.
pub const DEFAULT_FRESHNESS_WINDOW_MS: u64 = 60_000;

/// The three header values for one outgoing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    /// `0x`-prefixed signature hex.
    pub signature: String,
    /// `0x`-prefixed public key hex.
    pub public_key: String,
    /// Signing time in milliseconds.
    pub timestamp_ms: i64,
}

impl SignedHeaders {
    /// Build from a signature and the timestamp it covers.
    pub fn new(result: &SignResult, timestamp_ms: i64) -> Self {
        Self {
            signature: result.signature_hex(),
            public_key: result.public_key_hex(),
            timestamp_ms,
        }
    }

    /// Decimal header form of the timestamp.
    pub fn timestamp(&self) -> String {
        self.timestamp_ms.to_string()
    }

    /// `(name, value)` pairs in wire order.
    pub fn entries(&self) -> [(&'static str, String); 3] {
        [
            (SIGNATURE_HEADER, self.signature.clone()),
            (PUBLIC_KEY_HEADER, self.public_key.clone()),
            (TIMESTAMP_HEADER, self.timestamp()),
        ]
    }

    /// Insert into `headers`, replacing any existing values.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<(), SigningError> {
        for (name, value) in self.entries() {
            let value = HeaderValue::from_str(&value)
                .map_err(|e| SigningError::InvalidHeaderValue(e.to_string()))?;
            headers.insert(HeaderName::from_static(name), value);
        }
        Ok(())
    }
}

/// Header lookup that treats a missing, empty or non-ASCII value uniformly.
pub(crate) enum HeaderLookup<'a> {
    Missing,
    Unreadable,
    Present(&'a str),
}

pub(crate) fn lookup<'a>(headers: &'a HeaderMap, name: &'static str) -> HeaderLookup<'a> {
    match headers.get(name) {
        None => HeaderLookup::Missing,
        Some(value) if value.is_empty() => HeaderLookup::Missing,
        Some(value) => match value.to_str() {
            Ok(text) => HeaderLookup::Present(text),
            Err(_) => HeaderLookup::Unreadable,
        },
    }
}
