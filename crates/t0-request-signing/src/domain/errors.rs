//! # Domain Errors
//!
//! Every rejection maps onto exactly one [`RejectionStatus`], so callers can
//! tell a malformed request from a forged one from a broken server.

use http::StatusCode;
use t0_crypto::CryptoError;
use thiserror::Error;

use crate::domain::headers::{PUBLIC_KEY_HEADER, SIGNATURE_HEADER, TIMESTAMP_HEADER};

/// Rejection category surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionStatus {
    /// Missing or malformed input, or a stale timestamp.
    InvalidArgument,
    /// Unknown signer or a signature that does not verify.
    Unauthenticated,
    /// The server cannot perform verification.
    Internal,
}

impl RejectionStatus {
    /// Connect protocol error code.
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::Unauthenticated => "unauthenticated",
            Self::Internal => "internal",
        }
    }

    /// HTTP status for the Connect code.
    pub fn http_status(self) -> StatusCode {
        match self {
            Self::InvalidArgument => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Which header a format error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignedHeader {
    /// Signature header
    Signature,
    /// Public key header
    PublicKey,
    /// Timestamp header
    Timestamp,
}

impl SignedHeader {
    /// Lowercase wire name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Signature => SIGNATURE_HEADER,
            Self::PublicKey => PUBLIC_KEY_HEADER,
            Self::Timestamp => TIMESTAMP_HEADER,
        }
    }
}

impl std::fmt::Display for SignedHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Server-side verification failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationError {
    /// Header absent or empty
    #[error("missing required header: {0}")]
    MissingHeader(SignedHeader),

    /// Header value is not valid hex
    #[error("invalid header encoding: {0}")]
    MalformedHeader(SignedHeader),

    /// Timestamp header is not a decimal integer
    #[error("invalid timestamp header: {0}")]
    InvalidTimestamp(String),

    /// Timestamp too far from the server clock
    #[error("timestamp is outside the allowed time window")]
    StaleTimestamp {
        /// Timestamp carried by the request
        timestamp_ms: i64,
        /// Server clock at verification
        now_ms: i64,
        /// Allowed skew
        window_ms: u64,
    },

    /// Header block exceeds the configured limit
    #[error("request headers too large: {size} bytes exceeds limit of {limit}")]
    MetadataTooLarge {
        /// Observed size
        size: usize,
        /// Configured limit
        limit: usize,
    },

    /// Public key differs from the configured network key
    #[error("request signed with unknown public key")]
    UnknownPublicKey,

    /// Signature fails under every framing hypothesis
    #[error("signature verification failed")]
    SignatureMismatch,

    /// Transport delivered a decoded message instead of raw bytes
    #[error("server misconfiguration: signature verification requires raw bytes")]
    RawBytesUnavailable,

    /// Request body could not be read
    #[error("error reading request body")]
    BodyRead(String),
}

impl VerificationError {
    /// Rejection category.
    pub fn status(&self) -> RejectionStatus {
        match self {
            Self::MissingHeader(_)
            | Self::MalformedHeader(_)
            | Self::InvalidTimestamp(_)
            | Self::StaleTimestamp { .. }
            | Self::MetadataTooLarge { .. } => RejectionStatus::InvalidArgument,
            Self::UnknownPublicKey | Self::SignatureMismatch => RejectionStatus::Unauthenticated,
            Self::RawBytesUnavailable | Self::BodyRead(_) => RejectionStatus::Internal,
        }
    }
}

/// Client-side signing failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SigningError {
    /// Outbound message could not be serialized
    #[error("failed to serialize message for signing: {0}")]
    Serialization(String),

    /// Signing primitive failed
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Header value rejected by the transport
    #[error("invalid header value: {0}")]
    InvalidHeaderValue(String),

    /// Operation not allowed in the current call state
    #[error("cannot {operation} while call is {state}")]
    InvalidState {
        /// Attempted operation
        operation: &'static str,
        /// State at the time
        state: &'static str,
    },

    /// Outgoing request body could not be read
    #[error("error reading request body: {0}")]
    BodyRead(String),
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required environment variable not set
    #[error("missing environment variable: {0}")]
    MissingEnv(&'static str),

    /// Environment variable could not be parsed
    #[error("invalid value for {name}: {reason}")]
    InvalidEnv {
        /// Variable name
        name: &'static str,
        /// Parse failure
        reason: String,
    },

    /// Key material could not be parsed
    #[error("invalid key: {0}")]
    InvalidKey(#[from] CryptoError),

    /// Provider server has nothing to serve
    #[error("at least one service must be configured")]
    NoServices,

    /// Invalid size limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),

    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),

    /// Endpoint could not be parsed
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}
