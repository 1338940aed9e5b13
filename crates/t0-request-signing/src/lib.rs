//! # T-0 Request Signing
//!
//! Authenticates calls between the T-0 Network and its providers. Every
//! request carries three headers:
//!
//! - `x-signature`: 65-byte recoverable secp256k1 signature, `0x` hex
//! - `x-public-key`: the signer's uncompressed public key, `0x` hex
//! - `x-signature-timestamp`: signing time in Unix milliseconds
//!
//! The signature covers `keccak256(payload || timestamp_le_u64)` where
//! `payload` is the exact byte sequence on the wire.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): digests, timestamps, header codecs, config
//! - **Ports Layer** (`ports/`): signer/authenticator traits, clock and transport seams
//! - **Client** (`client.rs`): signing interceptor and call state machine
//! - **Server** (`server.rs`): two-phase verification interceptor
//! - **Adapters** (`adapters/`): tower layers over `axum` bodies
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use t0_crypto::Signer;
//! use t0_request_signing::{RequestSigner, SigningInterceptor};
//!
//! let signer = Arc::new(Signer::generate().unwrap());
//! let interceptor = SigningInterceptor::new(signer);
//! let headers = interceptor.sign_request(b"{\"quote\":1}").unwrap();
//! assert!(headers.signature.starts_with("0x"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod client;
pub mod domain;
pub mod ports;
pub mod server;

// Re-export public API
pub use adapters::{
    rejection_response, CallLoggingLayer, CallLoggingService, SignatureVerificationLayer,
    SignatureVerificationService, SigningLayer, SigningService,
};
pub use client::{CallState, SigningClientCall, SigningInterceptor};
pub use domain::config::{
    parse_endpoint, ClientConfig, EndpointInfo, ProviderServerConfig, VerifierConfig,
};
pub use domain::digest::{
    frame_header, frame_payload, framed_request_digest, request_digest, FramingHypothesis,
    FRAME_HEADER_LENGTH,
};
pub use domain::errors::{
    ConfigError, RejectionStatus, SignedHeader, SigningError, VerificationError,
};
pub use domain::headers::{
    SignedHeaders, DEFAULT_FRESHNESS_WINDOW_MS, PUBLIC_KEY_HEADER, SIGNATURE_HEADER,
    TIMESTAMP_HEADER,
};
pub use domain::timestamp::{
    decode_timestamp, encode_timestamp, is_within_window, parse_timestamp, TIMESTAMP_LENGTH,
};
pub use ports::inbound::{RequestAuthenticator, RequestSigner};
pub use ports::outbound::{
    BytesMarshaller, Clock, FixedClock, JsonMarshaller, MarshalError, RawClientCall,
    RequestMarshaller, SystemClock,
};
pub use server::{InboundMessage, PendingVerification, SignatureVerificationInterceptor};
