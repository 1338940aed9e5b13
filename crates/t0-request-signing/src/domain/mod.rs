//! # Domain Layer
//!
//! Wire formats, digests, errors and configuration. No I/O.

pub mod config;
pub mod digest;
pub mod errors;
pub mod headers;
pub mod timestamp;
