//! Configuration with validation.
//!
//! Every struct deserializes with `#[serde(default)]` and can also be read
//! from the process environment.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use t0_crypto::PublicKey;
use url::Url;

use crate::domain::errors::ConfigError;
use crate::domain::headers::DEFAULT_FRESHNESS_WINDOW_MS;

/// Provider signing key (hex).
pub const ENV_PROVIDER_PRIVATE_KEY: &str = "PROVIDER_PRIVATE_KEY";
/// Expected counterparty public key (hex).
pub const ENV_NETWORK_PUBLIC_KEY: &str = "NETWORK_PUBLIC_KEY";
/// Network endpoint URL.
pub const ENV_TZERO_ENDPOINT: &str = "TZERO_ENDPOINT";
/// Provider server port.
pub const ENV_PORT: &str = "PORT";
/// Freshness window override in milliseconds.
pub const ENV_SIGNATURE_WINDOW_MS: &str = "T0_SIGNATURE_WINDOW_MS";

/// Sandbox network endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api-sandbox.t-0.network";
/// Default provider server port.
pub const DEFAULT_PORT: u16 = 8080;
/// 4 MiB.
pub const DEFAULT_MAX_INBOUND_MESSAGE_SIZE: usize = 4 * 1024 * 1024;
/// 8 KiB.
pub const DEFAULT_MAX_INBOUND_METADATA_SIZE: usize = 8 * 1024;
/// 120 seconds.
pub const DEFAULT_HANDSHAKE_TIMEOUT_MS: u64 = 120_000;
/// 30 seconds.
pub const DEFAULT_CLIENT_TIMEOUT_MS: u64 = 30_000;

// =============================================================================
// VERIFIER
// =============================================================================

/// Server-side verification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Network public key, hex with optional `0x`
    pub network_public_key: String,
    /// Allowed clock skew in milliseconds
    pub freshness_window_ms: u64,
    /// Retry verification over a length-prefixed frame of the payload
    pub accept_length_prefixed_framing: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            network_public_key: String::new(),
            freshness_window_ms: DEFAULT_FRESHNESS_WINDOW_MS,
            accept_length_prefixed_framing: true,
        }
    }
}

impl VerifierConfig {
    /// Config for `network_public_key` with all other fields defaulted.
    pub fn new(network_public_key: impl Into<String>) -> Self {
        Self {
            network_public_key: network_public_key.into(),
            ..Self::default()
        }
    }

    /// Parsed network public key.
    pub fn public_key(&self) -> Result<PublicKey, ConfigError> {
        if self.network_public_key.is_empty() {
            return Err(ConfigError::MissingEnv(ENV_NETWORK_PUBLIC_KEY));
        }
        Ok(PublicKey::from_hex(&self.network_public_key)?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.public_key()?;
        if self.freshness_window_ms == 0 {
            return Err(ConfigError::InvalidTimeout(
                "freshness_window_ms cannot be 0".into(),
            ));
        }
        Ok(())
    }

    /// Read `NETWORK_PUBLIC_KEY` and `T0_SIGNATURE_WINDOW_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// Like [`Self::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let network_public_key =
            non_empty(&lookup, ENV_NETWORK_PUBLIC_KEY).ok_or(ConfigError::MissingEnv(ENV_NETWORK_PUBLIC_KEY))?;
        let freshness_window_ms = parse_or(&lookup, ENV_SIGNATURE_WINDOW_MS, DEFAULT_FRESHNESS_WINDOW_MS)?;

        let config = Self {
            network_public_key,
            freshness_window_ms,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// PROVIDER SERVER
// =============================================================================

/// Provider-side server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderServerConfig {
    /// Listen port
    pub port: u16,
    /// Names of the services mounted behind verification
    pub services: Vec<String>,
    /// Request body limit in bytes
    pub max_inbound_message_size: usize,
    /// Header block limit in bytes
    pub max_inbound_metadata_size: usize,
    /// Connection handshake timeout in milliseconds
    pub handshake_timeout_ms: u64,
    /// Signature verification
    pub verifier: VerifierConfig,
}

impl Default for ProviderServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            services: Vec::new(),
            max_inbound_message_size: DEFAULT_MAX_INBOUND_MESSAGE_SIZE,
            max_inbound_metadata_size: DEFAULT_MAX_INBOUND_METADATA_SIZE,
            handshake_timeout_ms: DEFAULT_HANDSHAKE_TIMEOUT_MS,
            verifier: VerifierConfig::default(),
        }
    }
}

impl ProviderServerConfig {
    /// Config for `port` and `network_public_key`; add services before use.
    pub fn new(port: u16, network_public_key: impl Into<String>) -> Self {
        Self {
            port,
            verifier: VerifierConfig::new(network_public_key),
            ..Self::default()
        }
    }

    /// Add a service name.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.services.push(service.into());
        self
    }

    /// Handshake timeout as a `Duration`.
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.services.is_empty() {
            return Err(ConfigError::NoServices);
        }

        if self.max_inbound_message_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_inbound_message_size cannot be 0".into(),
            ));
        }

        if self.max_inbound_metadata_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_inbound_metadata_size cannot be 0".into(),
            ));
        }

        if self.handshake_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout(
                "handshake_timeout_ms cannot be 0".into(),
            ));
        }

        self.verifier.validate()
    }

    /// Read `PORT` plus the verifier variables. Services are added by the caller.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// Like [`Self::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            port: parse_or(&lookup, ENV_PORT, DEFAULT_PORT)?,
            verifier: VerifierConfig::from_lookup(&lookup)?,
            ..Self::default()
        })
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// Outbound client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Network endpoint, scheme optional
    pub endpoint: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_ms: DEFAULT_CLIENT_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parsed endpoint.
    pub fn endpoint_info(&self) -> Result<EndpointInfo, ConfigError> {
        parse_endpoint(&self.endpoint)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint_info()?;
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout("timeout_ms cannot be 0".into()));
        }
        Ok(())
    }

    /// Read `TZERO_ENDPOINT`, falling back to the sandbox.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// Like [`Self::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            endpoint: non_empty(&lookup, ENV_TZERO_ENDPOINT)
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }
}

/// Host, port and transport security of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointInfo {
    /// Host name or address
    pub host: String,
    /// Port, defaulted from the scheme
    pub port: u16,
    /// `true` only for `http://`
    pub use_plaintext: bool,
}

/// Parse an endpoint such as `https://api.t-0.network`, `api.t-0.network:443`
/// or `http://localhost:8080`.
///
/// A missing scheme means `https`. Only `http` is plaintext. Default port is
/// 80 for plaintext and 443 otherwise.
pub fn parse_endpoint(endpoint: &str) -> Result<EndpointInfo, ConfigError> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(ConfigError::InvalidEndpoint(
            "endpoint must not be empty".into(),
        ));
    }

    let normalized = if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{endpoint}")
    };

    let url = Url::parse(&normalized)
        .map_err(|e| ConfigError::InvalidEndpoint(format!("{endpoint}: {e}")))?;

    let host = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| ConfigError::InvalidEndpoint(format!("{endpoint}: missing host")))?;

    let use_plaintext = url.scheme().eq_ignore_ascii_case("http");
    let default_port = if use_plaintext { 80 } else { 443 };

    Ok(EndpointInfo {
        host: host.to_string(),
        port: url.port().unwrap_or(default_port),
        use_plaintext,
    })
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn non_empty<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(lookup, name) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidEnv {
            name,
            reason: e.to_string(),
        }),
    }
}
