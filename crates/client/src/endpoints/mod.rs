//! Low-level HTTP endpoint functions.
//!
//! These functions take a `reqwest::Client` and the API URL explicitly so
//! they can be exercised against a mock server without building a
//! [`crate::FleetClient`].

mod multicall;
mod request;

pub use multicall::{MULTI_CALL_OPERATION, execute_multi_call, parse_multi_call_response};
pub use request::{RetryPolicy, send_request_with_retry};
