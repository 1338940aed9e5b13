//! # Inbound Ports (Driving Ports / API)

use http::HeaderMap;

use crate::domain::errors::{SigningError, VerificationError};
use crate::domain::headers::SignedHeaders;
use crate::server::PendingVerification;

/// Client side: produce headers for an exact payload.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait RequestSigner: Send + Sync {
    /// Sign `payload` at the current time.
    fn sign_request(&self, payload: &[u8]) -> Result<SignedHeaders, SigningError>;
}

/// Server side: authenticate an inbound call in two phases.
///
/// Headers are checked before the body is read; the returned
/// [`PendingVerification`] then checks the raw payload.
pub trait RequestAuthenticator: Send + Sync {
    /// Validate the signature headers against the configured network key.
    fn authenticate_headers(
        &self,
        headers: &HeaderMap,
    ) -> Result<PendingVerification, VerificationError>;
}
