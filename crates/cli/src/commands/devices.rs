//! Devices command: the device names the lookup cache resolves ids to.

use std::path::PathBuf;

use anyhow::Result;
use fleet_config::Config;
use tracing::info;

use crate::cancellation::CancellationToken;
use crate::commands::{host_context, open_session};
use crate::formatters::{DeviceEntry, OutputFormat, get_formatter, output_result};
use crate::progress::Spinner;

pub async fn run(
    config: Config,
    output_format: OutputFormat,
    quiet: bool,
    output_file: Option<PathBuf>,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut session = open_session(&config)?;

    let spinner = Spinner::new(!quiet, "Loading fleet data...");
    cancel
        .run(session.initialize(host_context(), || spinner.clear()))
        .await??;

    let devices: Vec<DeviceEntry> = session
        .lookups()
        .devices()
        .into_iter()
        .map(|(id, name)| DeviceEntry {
            id: id.to_string(),
            name: name.to_string(),
        })
        .collect();
    info!(count = devices.len(), "Listing devices");

    let formatter = get_formatter(output_format);
    let output = formatter.format_devices(&devices)?;
    output_result(&output, output_file.as_deref())
}
