//! `ExecuteMultiCall` endpoint.
//!
//! Responsibilities:
//! - Wrap a batch of logical calls in one JSON-RPC request.
//! - Map the response positionally back onto the calls.
//!
//! Invariants:
//! - Exactly one HTTP exchange per batch (plus retries of that same exchange).
//! - A JSON `null` slot becomes `None`; the result vector is never padded.

use fleet_config::Credentials;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::request::{RetryPolicy, send_request_with_retry};
use crate::error::{ClientError, Result};
use crate::metrics::MetricsCollector;
use crate::models::{ApiCall, RpcCredentials, RpcRequest, RpcResponse, json_kind};

/// Operation label used for logs and metrics.
pub const MULTI_CALL_OPERATION: &str = "ExecuteMultiCall";

/// Execute `calls` as a single `ExecuteMultiCall` request against `api_url`.
pub async fn execute_multi_call(
    client: &Client,
    api_url: &str,
    credentials: &Credentials,
    calls: &[ApiCall],
    max_retries: usize,
    timeout: std::time::Duration,
    metrics: Option<&MetricsCollector>,
) -> Result<Vec<Option<Value>>> {
    if calls.is_empty() {
        return Ok(Vec::new());
    }

    debug!(
        calls = calls.len(),
        types = ?calls.iter().map(ApiCall::type_name).collect::<Vec<_>>(),
        "Sending batched request"
    );
    if let Some(m) = metrics {
        m.record_batch_size(MULTI_CALL_OPERATION, calls.len());
    }

    let body = RpcRequest::multi_call(
        calls,
        RpcCredentials {
            database: &credentials.database,
            user_name: &credentials.user_name,
            session_id: credentials.session_id(),
        },
    );

    let builder = client.post(api_url).json(&body);
    let policy = RetryPolicy {
        max_retries,
        timeout,
        operation: MULTI_CALL_OPERATION,
    };
    let response = send_request_with_retry(builder, policy, metrics).await?;
    let text = response.text().await?;

    let result = parse_multi_call_response(&text);
    if let (Err(e), Some(m)) = (&result, metrics) {
        m.record_client_error(MULTI_CALL_OPERATION, e);
    }
    result
}

/// Parse a JSON-RPC body into positional results.
pub fn parse_multi_call_response(body: &str) -> Result<Vec<Option<Value>>> {
    let response: RpcResponse = serde_json::from_str(body)
        .map_err(|e| ClientError::InvalidResponse(format!("body is not JSON-RPC: {e}")))?;

    if let Some(error) = response.error {
        return Err(ClientError::Remote {
            name: error.name.unwrap_or_else(|| "Error".to_string()),
            message: error.message.unwrap_or_default(),
        });
    }

    match response.result {
        Some(Value::Array(slots)) => Ok(slots
            .into_iter()
            .map(|slot| if slot.is_null() { None } else { Some(slot) })
            .collect()),
        Some(other) => Err(ClientError::InvalidResponse(format!(
            "expected result array, got {}",
            json_kind(&other)
        ))),
        None => Err(ClientError::InvalidResponse(
            "response has neither result nor error".to_string(),
        )),
    }
}
