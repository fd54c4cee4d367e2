//! Fleet API client.
//!
//! [`FleetClient`] implements [`DataSource`] by sending every batch as one
//! `ExecuteMultiCall` JSON-RPC request.
//!
//! # Submodules
//! - [`builder`]: Client construction and configuration
//!
//! # What this module does NOT handle:
//! - Request/response wire details (delegated to [`crate::endpoints`])
//! - Obtaining a session; credentials are supplied already issued

pub mod builder;

use std::time::Duration;

use fleet_config::Credentials;
use serde_json::Value;

use crate::endpoints;
use crate::error::Result;
use crate::metrics::MetricsCollector;
use crate::models::ApiCall;
use crate::source::DataSource;

/// JSON-RPC client for the fleet telemetry API.
///
/// Use [`FleetClient::builder()`] to create one.
#[derive(Debug)]
pub struct FleetClient {
    pub(crate) http: reqwest::Client,
    pub(crate) server_url: String,
    pub(crate) api_url: String,
    pub(crate) credentials: Credentials,
    pub(crate) timeout: Duration,
    pub(crate) max_retries: usize,
    pub(crate) metrics: Option<MetricsCollector>,
}

impl FleetClient {
    /// Create a new client builder.
    pub fn builder() -> builder::FleetClientBuilder {
        builder::FleetClientBuilder::new()
    }

    /// Server URL without trailing slash.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Full JSON-RPC endpoint URL.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Execute `calls` as one batched request.
    pub async fn execute_multi_call(&self, calls: &[ApiCall]) -> Result<Vec<Option<Value>>> {
        endpoints::execute_multi_call(
            &self.http,
            &self.api_url,
            &self.credentials,
            calls,
            self.max_retries,
            self.timeout,
            self.metrics.as_ref(),
        )
        .await
    }
}

impl DataSource for FleetClient {
    async fn batch_fetch(&self, calls: &[ApiCall]) -> Result<Vec<Option<Value>>> {
        self.execute_multi_call(calls).await
    }
}
