//! # Adapters
//!
//! tower middleware that runs the signing protocols over `axum` HTTP bodies.

pub mod logging;
pub mod signing;
pub mod verification;

pub use logging::{CallLoggingLayer, CallLoggingService};
pub use signing::{SigningLayer, SigningService};
pub use verification::{rejection_response, SignatureVerificationLayer, SignatureVerificationService};
