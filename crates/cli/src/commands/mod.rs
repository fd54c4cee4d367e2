//! CLI command implementations.

pub mod categories;
pub mod devices;
pub mod run;

use anyhow::{Context, Result};
use fleet_client::{FleetClient, MetricsCollector};
use fleet_config::Config;
use fleet_report::{HostContext, ReportSession};
use tracing::info;

/// Name the CLI reports to the session as its host surface.
pub(crate) const HOST_NAME: &str = "fleet-cli";

/// Build a client for `config` and wrap it in a fresh report session.
pub(crate) fn open_session(config: &Config) -> Result<ReportSession<FleetClient>> {
    let client = FleetClient::builder()
        .from_config(config)
        .metrics(MetricsCollector::new())
        .build()
        .context("Failed to build fleet client")?;

    info!("Connecting to {}", config.connection.server_url);
    Ok(ReportSession::new(client, config.report))
}

/// Host context handed to `initialize`.
pub(crate) fn host_context() -> HostContext {
    HostContext::new(HOST_NAME)
}
