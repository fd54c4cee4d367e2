//! The remote data source capability.

use std::future::Future;

use serde_json::Value;

use crate::error::ClientError;
use crate::models::ApiCall;

/// A source that executes an ordered batch of calls in one round trip.
///
/// Results are positional: slot `i` answers `calls[i]`. The returned vector
/// may be shorter than `calls`, and any slot may be `None`; callers treat both
/// as "no result" rather than an error.
pub trait DataSource: Send + Sync {
    fn batch_fetch(
        &self,
        calls: &[ApiCall],
    ) -> impl Future<Output = Result<Vec<Option<Value>>, ClientError>> + Send;
}
