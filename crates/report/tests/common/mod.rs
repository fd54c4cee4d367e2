//! Common test utilities for report integration tests.
//!
//! # Invariants
//! - Fixtures come from the client crate's `fixtures/` directory
//!
//! # What this does NOT handle
//! - HTTP-level behavior (covered by the client crate's wiremock tests)

#[allow(unused_imports)]
pub use fleet_client::testing::{MockDataSource, load_fixture};

#[allow(unused_imports)]
pub use fleet_client::{ApiCall, ClientError};

/// A source serving the reference fixtures used by the lookup cache.
#[allow(dead_code)]
pub fn reference_source() -> MockDataSource {
    MockDataSource::new()
        .with_rows("Device", load_fixture("reference/devices.json"))
        .with_rows("Zone", load_fixture("reference/zones.json"))
        .with_rows("Rule", load_fixture("reference/rules.json"))
        .with_rows("User", load_fixture("reference/users.json"))
}

/// Reference fixtures plus trip and fault rows.
#[allow(dead_code)]
pub fn report_source() -> MockDataSource {
    reference_source()
        .with_rows("Trip", load_fixture("rows/trips.json"))
        .with_rows("FaultData", load_fixture("rows/faults.json"))
}

/// Type names of a batch, in call order.
#[allow(dead_code)]
pub fn type_names(batch: &[ApiCall]) -> Vec<String> {
    batch.iter().map(|call| call.type_name().to_string()).collect()
}
