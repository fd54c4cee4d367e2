//! JSON-RPC envelope for `ExecuteMultiCall`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::call::ApiCall;

/// Credentials block sent with every request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcCredentials<'a> {
    pub database: &'a str,
    pub user_name: &'a str,
    pub session_id: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MultiCallParams<'a> {
    pub calls: &'a [ApiCall],
    pub credentials: RpcCredentials<'a>,
}

/// Request body: `{"method": "ExecuteMultiCall", "params": {...}}`.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a> {
    pub method: &'static str,
    pub params: MultiCallParams<'a>,
}

impl<'a> RpcRequest<'a> {
    pub fn multi_call(calls: &'a [ApiCall], credentials: RpcCredentials<'a>) -> Self {
        Self {
            method: "ExecuteMultiCall",
            params: MultiCallParams { calls, credentials },
        }
    }
}

/// Error object of a failed JSON-RPC response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response body. Exactly one of `result` or `error` is expected.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

/// JSON type name of `value`, for log fields and decode errors.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GetParams, SearchFilter};

    #[test]
    fn test_request_envelope_shape() {
        let calls = vec![ApiCall::get(GetParams {
            type_name: "Device".to_string(),
            search: SearchFilter::default(),
            results_limit: 10_000,
        })];
        let request = RpcRequest::multi_call(
            &calls,
            RpcCredentials {
                database: "acme",
                user_name: "ops@acme.test",
                session_id: "s1",
            },
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["method"], "ExecuteMultiCall");
        assert_eq!(value["params"]["calls"][0]["params"]["typeName"], "Device");
        assert_eq!(value["params"]["credentials"]["userName"], "ops@acme.test");
        assert_eq!(value["params"]["credentials"]["sessionId"], "s1");
    }

    #[test]
    fn test_error_response_parses() {
        let body = r#"{"error": {"name": "JSONRPCError", "message": "Invalid session"}}"#;
        let response: RpcResponse = serde_json::from_str(body).unwrap();
        assert!(response.result.is_none());
        let error = response.error.unwrap();
        assert_eq!(error.name.as_deref(), Some("JSONRPCError"));
    }
}
