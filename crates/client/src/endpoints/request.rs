//! Retry helper for HTTP requests with exponential backoff.
//!
//! Responsibilities:
//! - Send a request, retrying on transient statuses (429, 502, 503, 504).
//! - Wait `2^attempt` seconds between attempts (1s, 2s, 4s, ...).
//! - Convert non-success responses into `ClientError::ApiError`.
//! - Record request, retry, latency, and error metrics when a collector is given.
//!
//! Does NOT handle:
//! - Parsing the JSON-RPC body (see multicall.rs).
//! - Retrying transport errors; those propagate immediately.

use std::time::{Duration, Instant};

use reqwest::{RequestBuilder, Response};
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::metrics::MetricsCollector;

/// Per-request settings threaded through the retry loop.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy<'a> {
    /// Retries after the initial attempt. 0 disables retrying.
    pub max_retries: usize,
    /// Client timeout, reported when a request times out.
    pub timeout: Duration,
    /// Operation label for logs and metrics.
    pub operation: &'a str,
}

/// Sends an HTTP request with automatic retry on transient statuses.
///
/// # Errors
///
/// - `ClientError::MaxRetriesExceeded` when every attempt got a retryable status.
/// - `ClientError::ApiError` for any other non-success status.
/// - Transport failures are classified by [`ClientError::from_transport`].
pub async fn send_request_with_retry(
    builder: RequestBuilder,
    policy: RetryPolicy<'_>,
    metrics: Option<&MetricsCollector>,
) -> Result<Response> {
    let mut last_status = 0u16;

    for attempt in 0..=policy.max_retries {
        let Some(attempt_builder) = builder.try_clone() else {
            debug!("Request builder cannot be cloned, single attempt only");
            return send_once(builder, policy, metrics).await;
        };

        if attempt > 0
            && let Some(m) = metrics
        {
            m.record_retry(policy.operation, attempt);
        }

        let started = Instant::now();
        if let Some(m) = metrics {
            m.record_request(policy.operation);
        }

        let response = match attempt_builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let url = e.url().map(|u| u.to_string()).unwrap_or_default();
                let err = ClientError::from_transport(e, policy.timeout, &url);
                if let Some(m) = metrics {
                    m.record_request_duration(policy.operation, started.elapsed(), None);
                    m.record_client_error(policy.operation, &err);
                }
                return Err(err);
            }
        };

        let status = response.status().as_u16();
        if let Some(m) = metrics {
            m.record_request_duration(policy.operation, started.elapsed(), Some(status));
        }

        if response.status().is_success() {
            if attempt > 0 {
                debug!(attempt = attempt + 1, "Request succeeded after retry");
            }
            return Ok(response);
        }

        if !ClientError::is_retryable_status(status) {
            let err = api_error(response).await;
            if let Some(m) = metrics {
                m.record_client_error(policy.operation, &err);
            }
            return Err(err);
        }

        last_status = status;
        if attempt < policy.max_retries {
            let backoff_secs = 2u64.pow(attempt as u32);
            debug!(
                attempt = attempt + 1,
                max_attempts = policy.max_retries + 1,
                status,
                backoff_secs,
                "Transient HTTP status, retrying with exponential backoff"
            );
            tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
        }
    }

    debug!(
        attempts = policy.max_retries + 1,
        last_status, "Max retries exhausted"
    );
    let err = ClientError::MaxRetriesExceeded {
        attempts: policy.max_retries + 1,
        last_status,
    };
    if let Some(m) = metrics {
        m.record_client_error(policy.operation, &err);
    }
    Err(err)
}

async fn send_once(
    builder: RequestBuilder,
    policy: RetryPolicy<'_>,
    metrics: Option<&MetricsCollector>,
) -> Result<Response> {
    if let Some(m) = metrics {
        m.record_request(policy.operation);
    }
    let response = builder
        .send()
        .await
        .map_err(|e| ClientError::from_transport(e, policy.timeout, ""))?;
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(api_error(response).await)
    }
}

async fn api_error(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let url = response.url().to_string();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error response body".to_string());
    ClientError::ApiError {
        status,
        url,
        message,
    }
}
