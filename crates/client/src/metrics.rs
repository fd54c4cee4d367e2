//! Metrics collection for API call performance.
//!
//! This module provides metrics collection for fleet API batches, including:
//! - Batch latency histograms
//! - Request counters (total, retries, errors)
//! - Batch size histograms
//!
//! # What this module does NOT handle:
//! - Metrics exposition/export (see [`crate::metrics_exporter`])
//! - Persistent storage of metrics
//!
//! # Invariants
//! - All metrics use consistent label names: `operation`, `status`, `error_category`
//! - Metric recording is infallible and never disrupts API calls
//! - Zero-cost when no metrics recorder is installed

use crate::error::ClientError;
use std::time::Duration;

/// Metric name for batch duration histogram.
pub const METRIC_REQUEST_DURATION: &str = "fleet_api_request_duration_seconds";

/// Metric name for total request counter.
pub const METRIC_REQUESTS_TOTAL: &str = "fleet_api_requests_total";

/// Metric name for retry counter.
pub const METRIC_RETRIES_TOTAL: &str = "fleet_api_retries_total";

/// Metric name for error counter.
pub const METRIC_ERRORS_TOTAL: &str = "fleet_api_errors_total";

/// Metric name for the number of logical calls per batch.
pub const METRIC_BATCH_SIZE: &str = "fleet_api_batch_size";

/// Error categories for metrics labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transport-level errors (connection refused, DNS, etc.)
    Transport,
    /// HTTP 4xx client errors
    Http4xx,
    /// HTTP 5xx server errors
    Http5xx,
    /// JSON-RPC error objects and malformed bodies
    Api,
    /// Request timeout
    Timeout,
    /// TLS/SSL errors
    Tls,
    /// Unknown/unclassified errors
    Unknown,
}

impl ErrorCategory {
    /// Returns the string label for this error category.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Transport => "transport",
            ErrorCategory::Http4xx => "http_4xx",
            ErrorCategory::Http5xx => "http_5xx",
            ErrorCategory::Api => "api",
            ErrorCategory::Timeout => "timeout",
            ErrorCategory::Tls => "tls",
            ErrorCategory::Unknown => "unknown",
        }
    }

    fn from_status(status: u16) -> Self {
        if (400..500).contains(&status) {
            ErrorCategory::Http4xx
        } else if (500..600).contains(&status) {
            ErrorCategory::Http5xx
        } else {
            ErrorCategory::Api
        }
    }
}

impl From<&ClientError> for ErrorCategory {
    fn from(error: &ClientError) -> Self {
        match error {
            ClientError::Timeout(_) => ErrorCategory::Timeout,
            ClientError::ConnectionRefused(_) => ErrorCategory::Transport,
            ClientError::TlsError(_) => ErrorCategory::Tls,
            ClientError::ApiError { status, .. } => ErrorCategory::from_status(*status),
            ClientError::MaxRetriesExceeded { last_status, .. } => {
                ErrorCategory::from_status(*last_status)
            }
            ClientError::Remote { .. } | ClientError::InvalidResponse(_) => ErrorCategory::Api,
            ClientError::HttpError(e) if e.is_connect() => ErrorCategory::Transport,
            ClientError::HttpError(e) if e.is_timeout() => ErrorCategory::Timeout,
            _ => ErrorCategory::Unknown,
        }
    }
}

/// Metrics collector for fleet API calls.
///
/// A lightweight wrapper around the `metrics` crate macros with consistent labels.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    enabled: bool,
}

impl MetricsCollector {
    /// Create a new, enabled metrics collector.
    pub fn new() -> Self {
        Self { enabled: true }
    }

    /// Create a disabled metrics collector that records nothing.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record the duration of one HTTP exchange.
    ///
    /// `status` is None if the request failed before receiving a response.
    pub fn record_request_duration(
        &self,
        operation: &str,
        duration: Duration,
        status: Option<u16>,
    ) {
        if !self.enabled {
            return;
        }

        let status_label = status.map_or("error".to_string(), |s| s.to_string());

        metrics::histogram!(METRIC_REQUEST_DURATION,
            "operation" => operation.to_string(),
            "status" => status_label,
        )
        .record(duration.as_secs_f64());
    }

    /// Record a request attempt, including retries.
    pub fn record_request(&self, operation: &str) {
        if !self.enabled {
            return;
        }

        metrics::counter!(METRIC_REQUESTS_TOTAL,
            "operation" => operation.to_string(),
        )
        .increment(1);
    }

    /// Record a retry attempt (1-based, not counting the initial request).
    pub fn record_retry(&self, operation: &str, attempt: usize) {
        if !self.enabled {
            return;
        }

        metrics::counter!(METRIC_RETRIES_TOTAL,
            "operation" => operation.to_string(),
            "attempt" => attempt.to_string(),
        )
        .increment(1);
    }

    /// Record an error.
    pub fn record_error(&self, operation: &str, category: ErrorCategory) {
        if !self.enabled {
            return;
        }

        metrics::counter!(METRIC_ERRORS_TOTAL,
            "operation" => operation.to_string(),
            "error_category" => category.as_str(),
        )
        .increment(1);
    }

    /// Record an error from a ClientError, categorizing it automatically.
    pub fn record_client_error(&self, operation: &str, error: &ClientError) {
        self.record_error(operation, ErrorCategory::from(error));
    }

    /// Record how many logical calls one batch carried.
    pub fn record_batch_size(&self, operation: &str, calls: usize) {
        if !self.enabled {
            return;
        }
        metrics::histogram!(METRIC_BATCH_SIZE,
            "operation" => operation.to_string(),
        )
        .record(calls as f64);
    }
}
