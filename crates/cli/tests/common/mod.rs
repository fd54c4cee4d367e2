//! Shared test utilities for fleet-cli integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory that prevents dotenv loading.
//! - Mount `ExecuteMultiCall` responses on a mock server.
//!
//! Invariants / Assumptions:
//! - All integration tests using this helper will be hermetic by default.
//! - Retries are disabled so error paths answer after one request.

use assert_cmd::Command;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Returns a hermetic `fleet-cli` command for integration testing.
///
/// It ensures:
/// - `DOTENV_DISABLED=1` is set to prevent local `.env` contamination.
/// - `FLEET_*` variables from the host are cleared.
pub fn fleet_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("fleet-cli");

    cmd.env("DOTENV_DISABLED", "1");

    cmd.env_remove("FLEET_SERVER_URL")
        .env_remove("FLEET_DATABASE")
        .env_remove("FLEET_USERNAME")
        .env_remove("FLEET_SESSION_ID")
        .env_remove("FLEET_CONFIG_PATH")
        .env_remove("FLEET_TIMEOUT")
        .env_remove("FLEET_SKIP_VERIFY")
        .env_remove("FLEET_RESULTS_LIMIT")
        .env_remove("FLEET_PAGE_SIZE")
        .env_remove("RUST_LOG");

    cmd
}

/// A hermetic command with full session credentials for `server_url`.
#[allow(dead_code)]
pub fn fleet_cmd_with_server(server_url: &str) -> Command {
    let mut cmd = fleet_cmd();
    cmd.env("FLEET_SERVER_URL", server_url)
        .env("FLEET_DATABASE", "acme")
        .env("FLEET_USERNAME", "ops@acme.test")
        .env("FLEET_SESSION_ID", "session-123")
        .env("FLEET_MAX_RETRIES", "0");
    cmd
}

/// Devices, zones, rules and users answered to the lookup cache load.
#[allow(dead_code)]
pub fn reference_result() -> Value {
    json!({
        "result": [
            [
                {"id": "b1", "name": "Truck 12", "serialNumber": "G9A1B2C3D4E5"},
                {"id": "b2", "name": "", "serialNumber": "G9FFEE001122"},
                {"id": "b4", "name": "alpha van", "serialNumber": "G9AA00BB11CC"}
            ],
            [{"id": "z1", "name": "Main Depot"}],
            [{"id": "RuleHarshBrakingId", "name": "Harsh Braking"}],
            [{"id": "u1", "firstName": "Jane", "lastName": "Doe", "name": "jdoe@acme.test"}]
        ]
    })
}

/// Three trips: a long one, a short one, and one without distance.
#[allow(dead_code)]
pub fn trip_rows() -> Value {
    json!([
        {
            "id": "t1",
            "device": {"id": "b1"},
            "driver": {"id": "u1"},
            "start": "2024-03-04T08:00:00.000Z",
            "stop": "2024-03-04T10:15:30.000Z",
            "distance": 182.456,
            "drivingDuration": "PT2H15M30S",
            "maximumSpeed": 104
        },
        {
            "id": "t2",
            "device": {"id": "b2"},
            "driver": {"id": "UnknownDriverId"},
            "start": "2024-03-05T07:30:00.000Z",
            "stop": "2024-03-05T08:00:00.000Z",
            "distance": 12,
            "maximumSpeed": 88.5
        },
        {
            "id": "t3",
            "device": {"id": "b9"},
            "start": "2024-03-06T12:00:00.000Z",
            "distance": null
        }
    ])
}

/// Answer the lookup cache load (the batch whose first call is `Device`).
#[allow(dead_code)]
pub async fn mount_reference(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/apiv1"))
        .and(body_partial_json(json!({
            "params": {"calls": [{"params": {"typeName": "Device", "resultsLimit": 10000}}]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reference_result()))
        .mount(server)
        .await;
}

/// Answer a report batch whose first call is `type_name`.
#[allow(dead_code)]
pub async fn mount_report(server: &MockServer, type_name: &str, body: Value) {
    Mock::given(method("POST"))
        .and(path("/apiv1"))
        .and(body_partial_json(json!({
            "params": {"calls": [{"params": {"typeName": type_name}}]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}
