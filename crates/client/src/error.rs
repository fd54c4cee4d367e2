//! Error types for the fleet client.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur during fleet API operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Non-success HTTP status from the server.
    #[error("API error ({status}) at {url}: {message}")]
    ApiError {
        status: u16,
        url: String,
        message: String,
    },

    /// JSON-RPC error object returned in a successful HTTP response.
    #[error("{name}: {message}")]
    Remote { name: String, message: String },

    /// Response body was not the expected JSON-RPC shape.
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// Request timed out.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection refused.
    #[error("Connection refused to {0}")]
    ConnectionRefused(String),

    /// TLS/SSL error.
    #[error("TLS error: {0}")]
    TlsError(String),

    /// Maximum retries exceeded; carries the last retryable status seen.
    #[error("Maximum retries exceeded ({attempts} attempts, last status {last_status})")]
    MaxRetriesExceeded { attempts: usize, last_status: u16 },

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Client built without session credentials.
    #[error("API credentials are required")]
    MissingCredentials,
}

impl ClientError {
    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::HttpError(_) | Self::Timeout(_))
    }

    /// Check if an HTTP status code is retryable.
    ///
    /// Retryable status codes:
    /// - 429: Too Many Requests (rate limiting)
    /// - 502: Bad Gateway (transient server error)
    /// - 503: Service Unavailable (transient server error)
    /// - 504: Gateway Timeout (transient server error)
    ///
    /// Everything else fails immediately.
    pub fn is_retryable_status(status: u16) -> bool {
        matches!(status, 429 | 502 | 503 | 504)
    }

    /// HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            Self::MaxRetriesExceeded { last_status, .. } => Some(*last_status),
            Self::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True if the server kept answering 429.
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    /// True for transport-level failures (no HTTP response at all).
    pub fn is_connection_error(&self) -> bool {
        match self {
            Self::ConnectionRefused(_) | Self::TlsError(_) | Self::Timeout(_) => true,
            Self::HttpError(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }

    /// Convert a transport error, classifying timeouts separately.
    pub(crate) fn from_transport(err: reqwest::Error, timeout: Duration, url: &str) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_connect() {
            Self::ConnectionRefused(url.to_string())
        } else {
            Self::HttpError(err)
        }
    }
}
