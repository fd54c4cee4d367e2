//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map client, report and configuration errors to exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//! - Signal handling (see cancellation.rs for SIGINT handling).
//!
//! Invariants:
//! - Exit codes 1-9 are reserved for specific error categories.
//! - Exit code 130 is reserved for SIGINT (Unix standard: 128 + SIGINT).

use fleet_client::ClientError;
use fleet_config::ConfigError;
use fleet_report::ReportError;

/// Structured exit codes for fleet-cli.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success - command completed successfully.
    Success = 0,

    /// General error - unhandled or generic failure, including remote API
    /// errors reported inside a successful response.
    GeneralError = 1,

    /// Connection error - network, timeout, or DNS failure.
    ///
    /// Scripts may retry with exponential backoff.
    ConnectionError = 3,

    /// Validation error - bad arguments, configuration or selection.
    ///
    /// Scripts should fix the input and not retry the same request.
    ValidationError = 5,

    /// Rate limited - HTTP 429 Too Many Requests.
    ///
    /// Scripts should back off and retry later.
    RateLimited = 7,

    /// Service unavailable - HTTP 502/503/504.
    ///
    /// Scripts should back off and retry later.
    ServiceUnavailable = 8,

    /// Interrupted - SIGINT/Ctrl+C (Unix standard: 128 + 2).
    Interrupted = 130,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }

    /// Returns true if this exit code indicates a retryable condition.
    #[allow(dead_code)]
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            ExitCode::ConnectionError | ExitCode::RateLimited | ExitCode::ServiceUnavailable
        )
    }

    fn from_status(status: u16) -> Self {
        match status {
            429 => ExitCode::RateLimited,
            502..=504 => ExitCode::ServiceUnavailable,
            400 => ExitCode::ValidationError,
            _ => ExitCode::GeneralError,
        }
    }
}

impl From<&ClientError> for ExitCode {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::ConnectionRefused(_)
            | ClientError::Timeout(_)
            | ClientError::InvalidUrl(_)
            | ClientError::TlsError(_) => ExitCode::ConnectionError,

            ClientError::HttpError(e) => {
                if e.is_connect() || e.is_timeout() {
                    ExitCode::ConnectionError
                } else {
                    ExitCode::GeneralError
                }
            }

            ClientError::ApiError { status, .. } => Self::from_status(*status),
            ClientError::MaxRetriesExceeded { last_status, .. } => Self::from_status(*last_status),

            ClientError::MissingCredentials => ExitCode::ValidationError,

            ClientError::Remote { .. } | ClientError::InvalidResponse(_) => ExitCode::GeneralError,
        }
    }
}

impl From<&ReportError> for ExitCode {
    fn from(err: &ReportError) -> Self {
        match err.client_error() {
            Some(client) => Self::from(client),
            None if err.is_validation() => ExitCode::ValidationError,
            None => ExitCode::GeneralError,
        }
    }
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Extract the appropriate exit code from this error.
    ///
    /// Returns ExitCode::GeneralError if no known error type is in the chain.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if let Some(report_err) = cause.downcast_ref::<ReportError>() {
                return ExitCode::from(report_err);
            }
            if let Some(client_err) = cause.downcast_ref::<ClientError>() {
                return ExitCode::from(client_err);
            }
            if cause.downcast_ref::<ConfigError>().is_some() {
                return ExitCode::ValidationError;
            }
        }

        ExitCode::GeneralError
    }
}
