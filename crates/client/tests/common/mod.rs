//! Common test utilities for integration tests.
//!
//! # Invariants
//! - Fixtures are loaded from the `fixtures/` directory relative to the crate root
//!
//! # What this does NOT handle
//! - Mock server setup (use wiremock directly in tests)

use std::time::Duration;

#[allow(unused_imports)]
pub use fleet_client::testing::load_fixture;

#[allow(unused_imports)]
pub use fleet_client::{ApiCall, ClientError, DataSource, FleetClient, GetParams, SearchFilter};
#[allow(unused_imports)]
pub use wiremock::{Mock, MockServer, ResponseTemplate};

/// Build a client pointed at the mock server.
#[allow(dead_code)]
pub fn client_for(server: &MockServer, max_retries: usize) -> FleetClient {
    FleetClient::builder()
        .server_url(server.uri())
        .credentials(fleet_config::Credentials::new(
            "acme",
            "ops@acme.test",
            "session-123",
        ))
        .max_retries(max_retries)
        .build()
        .expect("client should build")
}

/// A `Get` call with an empty filter.
#[allow(dead_code)]
pub fn get_call(type_name: &str, limit: u32) -> ApiCall {
    ApiCall::get(GetParams {
        type_name: type_name.to_string(),
        search: SearchFilter::default(),
        results_limit: limit,
    })
}

/// Advance Tokio's paused clock and yield so sleepers can observe the change.
#[allow(dead_code)]
pub async fn advance_and_yield(duration: Duration) {
    tokio::time::advance(duration).await;
    tokio::task::yield_now().await;
}

/// Assert that a task has not completed after yielding to the scheduler.
#[allow(dead_code)]
pub async fn assert_pending<T>(handle: &tokio::task::JoinHandle<T>, context: &str) {
    tokio::task::yield_now().await;
    assert!(!handle.is_finished(), "Expected pending task: {}", context);
}
