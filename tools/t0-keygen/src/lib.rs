//! T0-Keygen: provider key management for the T-0 Network
//!
//! - `generate`: fresh key pair, optionally written into a `.env` file
//! - `public-key`: derive the public key of a private key
//! - `sign` / `verify`: offline request signing and checking

pub mod commands;
pub mod env_file;

use tracing_subscriber::EnvFilter;

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "T0_LOG";

/// Install the `fmt` subscriber. Diagnostics go to stderr so stdout stays
/// machine-readable.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // A second call (tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
