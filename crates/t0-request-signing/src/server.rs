//! # Verification Protocol (server side)
//!
//! Inbound calls are checked in two phases:
//!
//! 1. [`SignatureVerificationInterceptor::authenticate_headers`] validates the
//!    three signature headers, the freshness window and the signer's identity
//!    before any payload is read.
//! 2. [`PendingVerification::on_message`] verifies the signature over the raw
//!    payload bytes and hands the same bytes on for decoding.
//!
//! Header checks run in a fixed order: public key, signature, timestamp, then
//! key equality.

use std::sync::Arc;

use bytes::Bytes;
use http::HeaderMap;
use t0_crypto::hex::hex_to_bytes;
use t0_crypto::{EcdsaVerifier, PublicKey};
use tracing::{debug, error, warn};

use crate::domain::config::VerifierConfig;
use crate::domain::digest::FramingHypothesis;
use crate::domain::errors::{ConfigError, SignedHeader, VerificationError};
use crate::domain::headers::{lookup, HeaderLookup};
use crate::domain::timestamp::{is_within_window, parse_timestamp};
use crate::ports::inbound::RequestAuthenticator;
use crate::ports::outbound::{Clock, SystemClock};

const BARE_ONLY: &[FramingHypothesis] = &[FramingHypothesis::Bare];
const BARE_THEN_FRAMED: &[FramingHypothesis] =
    &[FramingHypothesis::Bare, FramingHypothesis::LengthPrefixed];

/// A message as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage<T> {
    /// Undecoded payload bytes.
    Raw(Bytes),
    /// Already decoded; the signed bytes are gone.
    Decoded(T),
}

/// Verifies inbound calls against one network public key.
#[derive(Clone)]
pub struct SignatureVerificationInterceptor {
    expected_public_key: PublicKey,
    freshness_window_ms: u64,
    hypotheses: &'static [FramingHypothesis],
    clock: Arc<dyn Clock>,
    verifier: EcdsaVerifier,
}

impl SignatureVerificationInterceptor {
    /// Interceptor using the system clock.
    pub fn new(config: &VerifierConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Interceptor with an injected clock.
    pub fn with_clock(config: &VerifierConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            expected_public_key: config.public_key()?,
            freshness_window_ms: config.freshness_window_ms,
            hypotheses: if config.accept_length_prefixed_framing {
                BARE_THEN_FRAMED
            } else {
                BARE_ONLY
            },
            clock,
            verifier: EcdsaVerifier::new(),
        })
    }

    /// The configured network key.
    pub fn expected_public_key(&self) -> &PublicKey {
        &self.expected_public_key
    }

    /// Header phase. See the module docs for the check order.
    pub fn check_headers(&self, headers: &HeaderMap) -> Result<PendingVerification, VerificationError> {
        let result = self.check_headers_inner(headers);
        if let Err(e) = &result {
            warn!(error = %e, status = e.status().code(), "Rejecting request");
        }
        result
    }

    fn check_headers_inner(&self, headers: &HeaderMap) -> Result<PendingVerification, VerificationError> {
        let public_key = hex_header(headers, SignedHeader::PublicKey)?;
        let signature = hex_header(headers, SignedHeader::Signature)?;
        let timestamp_ms = self.timestamp_header(headers)?;

        if !self.verifier.public_keys_equal(
            Some(public_key.as_slice()),
            Some(self.expected_public_key.as_bytes().as_slice()),
        ) {
            return Err(VerificationError::UnknownPublicKey);
        }

        Ok(PendingVerification {
            public_key,
            signature,
            timestamp_ms,
            hypotheses: self.hypotheses,
            verifier: self.verifier,
        })
    }

    fn timestamp_header(&self, headers: &HeaderMap) -> Result<i64, VerificationError> {
        let header = SignedHeader::Timestamp;
        let value = match lookup(headers, header.name()) {
            HeaderLookup::Missing => return Err(VerificationError::MissingHeader(header)),
            HeaderLookup::Unreadable => {
                return Err(VerificationError::InvalidTimestamp(
                    "non-ascii header value".into(),
                ))
            }
            HeaderLookup::Present(value) => value,
        };

        let timestamp_ms =
            parse_timestamp(value).map_err(|e| VerificationError::InvalidTimestamp(e.to_string()))?;

        let now_ms = self.clock.now_millis();
        if !is_within_window(now_ms, timestamp_ms, self.freshness_window_ms) {
            return Err(VerificationError::StaleTimestamp {
                timestamp_ms,
                now_ms,
                window_ms: self.freshness_window_ms,
            });
        }

        Ok(timestamp_ms)
    }

    /// Both phases at once over an already-buffered payload.
    pub fn verify_request(
        &self,
        headers: &HeaderMap,
        payload: &[u8],
    ) -> Result<FramingHypothesis, VerificationError> {
        self.check_headers(headers)?.verify_payload(payload)
    }
}

impl RequestAuthenticator for SignatureVerificationInterceptor {
    fn authenticate_headers(
        &self,
        headers: &HeaderMap,
    ) -> Result<PendingVerification, VerificationError> {
        self.check_headers(headers)
    }
}

impl std::fmt::Debug for SignatureVerificationInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerificationInterceptor")
            .field("expected_public_key", &self.expected_public_key)
            .field("freshness_window_ms", &self.freshness_window_ms)
            .field("hypotheses", &self.hypotheses)
            .finish_non_exhaustive()
    }
}

/// Decode a `0x`-hex header, distinguishing absent from malformed.
fn hex_header(headers: &HeaderMap, header: SignedHeader) -> Result<Vec<u8>, VerificationError> {
    let value = match lookup(headers, header.name()) {
        HeaderLookup::Missing => return Err(VerificationError::MissingHeader(header)),
        HeaderLookup::Unreadable => return Err(VerificationError::MalformedHeader(header)),
        HeaderLookup::Present(value) => value,
    };

    match hex_to_bytes(value) {
        Ok(bytes) if !bytes.is_empty() => Ok(bytes),
        _ => Err(VerificationError::MalformedHeader(header)),
    }
}

/// Header-validated call awaiting its payload.
///
/// Owned by a single inbound call.
#[derive(Debug, Clone)]
pub struct PendingVerification {
    public_key: Vec<u8>,
    signature: Vec<u8>,
    timestamp_ms: i64,
    hypotheses: &'static [FramingHypothesis],
    verifier: EcdsaVerifier,
}

impl PendingVerification {
    /// Timestamp carried by the request.
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    /// Verify `payload` under each framing hypothesis in turn.
    pub fn verify_payload(&self, payload: &[u8]) -> Result<FramingHypothesis, VerificationError> {
        for &hypothesis in self.hypotheses {
            let Some(digest) = hypothesis.digest(payload, self.timestamp_ms) else {
                continue;
            };
            if self
                .verifier
                .verify(&self.public_key, &digest, &self.signature)
            {
                debug!(framing = %hypothesis, payload_len = payload.len(), "Signature verified");
                return Ok(hypothesis);
            }
        }

        warn!(
            payload_len = payload.len(),
            timestamp_ms = self.timestamp_ms,
            "Signature verification failed under every framing"
        );
        Err(VerificationError::SignatureMismatch)
    }

    /// Payload phase. Returns the verified bytes unchanged.
    ///
    /// A decoded message means the transport was not configured to expose
    /// raw bytes; that is a server misconfiguration and every such call is
    /// refused.
    pub fn on_message<T>(&self, message: InboundMessage<T>) -> Result<Bytes, VerificationError> {
        match message {
            InboundMessage::Raw(bytes) => {
                self.verify_payload(&bytes)?;
                Ok(bytes)
            }
            InboundMessage::Decoded(_) => {
                error!("Signature verification requires raw request bytes");
                Err(VerificationError::RawBytesUnavailable)
            }
        }
    }
}
