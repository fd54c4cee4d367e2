//! Connection configuration types.
//!
//! Responsibilities:
//! - Define connection settings (server URL, TLS verification, timeout, retries).
//! - Define the main `Config` structure combining connection, credentials and report defaults.
//!
//! Does NOT handle:
//! - Configuration loading (see `loader` module).
//! - Actual network connections (see client crate).
//!
//! Invariants:
//! - Duration fields are serialized as whole seconds.
//! - `server_url` never carries a trailing slash once built by the loader.

use crate::constants::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS};
use crate::types::credentials::Credentials;
use crate::types::report::ReportDefaults;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Module for serializing Duration as seconds (integer).
mod duration_seconds {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

/// Connection configuration for the telemetry server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Server URL without the API path (e.g. https://my.fleet.example.com)
    pub server_url: String,
    /// Whether to skip TLS verification (for self-signed certificates)
    pub skip_verify: bool,
    /// Request timeout (serialized as seconds)
    #[serde(with = "duration_seconds")]
    pub timeout: Duration,
    /// Maximum number of retries for rate-limited or unavailable responses
    pub max_retries: usize,
}

impl ConnectionConfig {
    /// Connection settings for `server_url` with default timeout and retries.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            skip_verify: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone)]
pub struct Config {
    /// Connection settings
    pub connection: ConnectionConfig,
    /// API session credentials
    pub credentials: Credentials,
    /// Report presentation defaults
    pub report: ReportDefaults,
}

impl Config {
    /// Build a config from its parts with default report settings.
    pub fn new(connection: ConnectionConfig, credentials: Credentials) -> Self {
        Self {
            connection,
            credentials,
            report: ReportDefaults::default(),
        }
    }
}
