//! Error types for the reporting core.
//!
//! Every failure here is recoverable: the session turns it into a status
//! line and keeps its previous state.

use fleet_client::ClientError;
use thiserror::Error;

/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    /// Input rejected before any request was made.
    #[error("{0}")]
    Validation(String),

    /// Category selection is full.
    #[error("At most {max} data categories can be selected.")]
    SelectionLimit { max: usize },

    #[error("Unknown data category: {0}")]
    UnknownCategory(String),

    #[error("Unknown field '{field}' for {category}")]
    UnknownField { category: String, field: String },

    /// Bulk reference load failed; the cache stays unloaded.
    #[error("Cache load error: {0}")]
    CacheLoad(#[source] ClientError),

    /// Batched query failed; previous results are kept.
    #[error("Error: {0}")]
    QueryExecution(#[source] ClientError),
}

impl ReportError {
    /// Text for the session's status line.
    pub fn status_message(&self) -> String {
        self.to_string()
    }

    /// Underlying client error for failures of the two remote operations.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            Self::CacheLoad(e) | Self::QueryExecution(e) => Some(e),
            _ => None,
        }
    }

    /// True for input problems the user can fix without retrying the network.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::SelectionLimit { .. }
                | Self::UnknownCategory(_)
                | Self::UnknownField { .. }
        )
    }
}
