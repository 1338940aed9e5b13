//! # Benchmarks
//!
//! Hashing, signing and verification throughput.

pub mod crypto;
