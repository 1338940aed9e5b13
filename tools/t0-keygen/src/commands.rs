//! Subcommand implementations, kept free of argument parsing and printing.

use std::sync::Arc;

use anyhow::{Context, Result};
use http::{HeaderMap, HeaderValue};
use t0_crypto::{PrivateKey, Signer};
use t0_request_signing::{
    Clock, FixedClock, FramingHypothesis, SignatureVerificationInterceptor, SignedHeaders,
    SigningInterceptor, SystemClock, VerifierConfig, PUBLIC_KEY_HEADER, SIGNATURE_HEADER,
    TIMESTAMP_HEADER,
};
use tracing::debug;

/// Hex key pair without `0x` prefixes.
#[derive(Debug, Clone)]
pub struct KeyPair {
    /// 32-byte private key
    pub private_key_hex: String,
    /// 65-byte uncompressed public key
    pub public_key_hex: String,
}

/// Generate a random key pair.
pub fn generate() -> Result<KeyPair> {
    let private_key = PrivateKey::generate();
    let signer = Signer::new(&private_key).context("deriving public key")?;
    Ok(KeyPair {
        private_key_hex: private_key.to_hex(),
        public_key_hex: signer.public_key_hex(),
    })
}

/// `0x`-prefixed public key for a hex private key.
pub fn public_key(private_key_hex: &str) -> Result<String> {
    let signer = Signer::from_hex(private_key_hex).context("invalid private key")?;
    Ok(signer.public_key_hex_prefixed())
}

/// Sign `body` as a request sent at `timestamp_ms` (now when `None`).
pub fn sign(private_key_hex: &str, body: &[u8], timestamp_ms: Option<i64>) -> Result<SignedHeaders> {
    let signer = Signer::from_hex(private_key_hex).context("invalid private key")?;
    let interceptor = SigningInterceptor::new(Arc::new(signer));
    let timestamp_ms = timestamp_ms.unwrap_or_else(|| SystemClock.now_millis());

    interceptor
        .sign_at(body, timestamp_ms)
        .context("signing request")
}

/// Header values of a request to check offline.
#[derive(Debug, Clone)]
pub struct VerifyRequest<'a> {
    /// Expected signer
    pub network_public_key: &'a str,
    /// `x-signature` value
    pub signature: &'a str,
    /// `x-public-key` value
    pub public_key: &'a str,
    /// `x-signature-timestamp` value
    pub timestamp: &'a str,
    /// Raw request body
    pub body: &'a [u8],
    /// Verification time, defaults to now
    pub now_ms: Option<i64>,
    /// Freshness window
    pub window_ms: u64,
}

/// Run the full server-side check and return the matching framing.
pub fn verify(request: &VerifyRequest<'_>) -> Result<FramingHypothesis> {
    let config = VerifierConfig {
        freshness_window_ms: request.window_ms,
        ..VerifierConfig::new(request.network_public_key)
    };
    let now_ms = request.now_ms.unwrap_or_else(|| SystemClock.now_millis());
    let interceptor =
        SignatureVerificationInterceptor::with_clock(&config, Arc::new(FixedClock::new(now_ms)))
            .context("invalid network public key")?;

    let mut headers = HeaderMap::new();
    for (name, value) in [
        (SIGNATURE_HEADER, request.signature),
        (PUBLIC_KEY_HEADER, request.public_key),
        (TIMESTAMP_HEADER, request.timestamp),
    ] {
        let value = HeaderValue::from_str(value).with_context(|| format!("invalid {name} value"))?;
        headers.insert(name, value);
    }

    let hypothesis = interceptor.verify_request(&headers, request.body)?;
    debug!(framing = %hypothesis, "Offline verification succeeded");
    Ok(hypothesis)
}
