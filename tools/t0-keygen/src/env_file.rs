//! `.env` provisioning from a `.env.example` template.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use t0_request_signing::domain::config::ENV_PROVIDER_PRIVATE_KEY;

/// Marker line the provider's public key comment is inserted before.
pub const NETWORK_KEY_MARKER: &str = "# T-0 Network's public key";

/// Fill `PROVIDER_PRIVATE_KEY=` and annotate the provider's public key.
///
/// Lines that do not match are copied through untouched.
pub fn render(template: &str, private_key_hex: &str, public_key_hex: &str) -> String {
    let key_assignment = format!("{ENV_PROVIDER_PRIVATE_KEY}=");

    template
        .replace(&key_assignment, &format!("{key_assignment}{private_key_hex}"))
        .replace(
            NETWORK_KEY_MARKER,
            &format!(
                "# Your provider's public key (share with T-0 team)\n\
                 # Public key: 0x{public_key_hex}\n\n{NETWORK_KEY_MARKER}"
            ),
        )
}

/// Read `template`, render it and write the result to `output`.
pub fn write(template: &Path, output: &Path, private_key_hex: &str, public_key_hex: &str) -> Result<()> {
    let content = fs::read_to_string(template)
        .with_context(|| format!("reading template {}", template.display()))?;

    fs::write(output, render(&content, private_key_hex, public_key_hex))
        .with_context(|| format!("writing {}", output.display()))?;

    tracing::info!(path = %output.display(), "Wrote environment file");
    Ok(())
}
