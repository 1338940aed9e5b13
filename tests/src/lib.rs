//! # T-0 Request Signing Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── benchmarks/       # criterion benchmarks, registered from benches/
//! │   └── crypto.rs
//! │
//! └── integration/      # Client and server protocols wired together
//!     ├── end_to_end.rs # In-memory transport
//!     └── http_layers.rs# tower/axum stack
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p t0-tests
//!
//! # By category
//! cargo test -p t0-tests integration::end_to_end
//! cargo test -p t0-tests integration::http_layers
//!
//! # Benchmarks
//! cargo bench -p t0-tests
//! ```

pub mod benchmarks;
pub mod integration;
