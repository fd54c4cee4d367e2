//! Client builder for constructing [`FleetClient`] instances.
//!
//! This module is responsible for:
//! - Providing a fluent builder API for client configuration
//! - Validating required configuration (server_url, credentials)
//! - Normalizing the server URL and deriving the API endpoint URL
//! - Configuring the underlying HTTP client (timeouts, TLS verification)
//!
//! # What this module does NOT handle:
//! - Actual API calls (handled by [`FleetClient`] and [`crate::endpoints`])
//!
//! # Invariants
//! - `server_url` and `credentials` are required and must be provided before calling `build()`
//! - The API URL is always `<server_url without trailing slash>/<api path>`
//! - `skip_verify` only affects HTTPS connections; HTTP connections log a warning

use std::time::Duration;

use fleet_config::{
    Config, Credentials,
    constants::{DEFAULT_API_PATH, DEFAULT_MAX_REDIRECTS, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS},
};

use crate::client::FleetClient;
use crate::error::{ClientError, Result};
use crate::metrics::MetricsCollector;

/// Builder for creating a new [`FleetClient`].
///
/// # Example
///
/// ```rust,ignore
/// use fleet_client::FleetClient;
/// use fleet_config::Credentials;
///
/// let client = FleetClient::builder()
///     .server_url("https://my.fleet.example.com".to_string())
///     .credentials(Credentials::new("acme", "ops@acme.test", session_id))
///     .timeout(Duration::from_secs(60))
///     .build()?;
/// ```
pub struct FleetClientBuilder {
    server_url: Option<String>,
    api_path: String,
    credentials: Option<Credentials>,
    skip_verify: bool,
    timeout: Duration,
    max_retries: usize,
    metrics: Option<MetricsCollector>,
}

impl Default for FleetClientBuilder {
    fn default() -> Self {
        Self {
            server_url: None,
            api_path: DEFAULT_API_PATH.to_string(),
            credentials: None,
            skip_verify: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            metrics: None,
        }
    }
}

impl FleetClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the server URL, e.g. `https://my.fleet.example.com`.
    ///
    /// Trailing slashes will be automatically removed.
    pub fn server_url(mut self, url: String) -> Self {
        self.server_url = Some(url);
        self
    }

    /// Override the API path appended to the server URL (default `apiv1`).
    pub fn api_path(mut self, path: impl Into<String>) -> Self {
        self.api_path = path.into();
        self
    }

    /// Set the API session credentials.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set whether to skip TLS certificate verification.
    ///
    /// # Security Warning
    /// Only use this against development servers with self-signed certificates.
    pub fn skip_verify(mut self, skip: bool) -> Self {
        self.skip_verify = skip;
        self
    }

    /// Set the request timeout. Default is 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retries for transient statuses.
    ///
    /// Default is 3 retries with exponential backoff (1s, 2s, 4s delays).
    pub fn max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the metrics collector for batch performance tracking.
    pub fn metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Create a client builder from loaded configuration.
    pub fn from_config(mut self, config: &Config) -> Self {
        self.server_url = Some(config.connection.server_url.clone());
        self.credentials = Some(config.credentials.clone());
        self.skip_verify = config.connection.skip_verify;
        self.timeout = config.connection.timeout;
        self.max_retries = config.connection.max_retries;
        self
    }

    /// Build the [`FleetClient`] with the configured options.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if `server_url` was not provided.
    /// Returns [`ClientError::MissingCredentials`] if `credentials` was not provided.
    /// Returns `ClientError::HttpError` if the HTTP client fails to build.
    pub fn build(self) -> Result<FleetClient> {
        let server_url = self
            .server_url
            .ok_or_else(|| ClientError::InvalidUrl("server_url is required".to_string()))?;
        let server_url = server_url.trim_end_matches('/').to_string();
        if server_url.is_empty() {
            return Err(ClientError::InvalidUrl("server_url is empty".to_string()));
        }

        let credentials = self.credentials.ok_or(ClientError::MissingCredentials)?;

        let api_url = format!("{}/{}", server_url, self.api_path.trim_matches('/'));

        let mut http_builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(DEFAULT_MAX_REDIRECTS));

        if self.skip_verify {
            if server_url.starts_with("https://") {
                http_builder = http_builder.danger_accept_invalid_certs(true);
            } else {
                tracing::warn!(
                    "skip_verify=true has no effect on HTTP URLs. TLS verification only applies to HTTPS connections."
                );
            }
        }

        let http = http_builder.build()?;

        Ok(FleetClient {
            http,
            server_url,
            api_url,
            credentials,
            timeout: self.timeout,
            max_retries: self.max_retries,
            metrics: self.metrics,
        })
    }
}
