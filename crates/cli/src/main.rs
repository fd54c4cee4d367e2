//! Fleet CLI - Command-line host for the fleet telemetry reporting core.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Run reports through `fleet_report` over the shared API client.
//! - Format and display results in table, JSON or CSV form.
//!
//! Does NOT handle:
//! - Query building, lookups or table logic (see `crates/report`).
//! - Long-term persistence of report results beyond explicit exports.
//!
//! Invariants:
//! - `load_dotenv()` is called BEFORE CLI parsing to allow `.env` to provide clap defaults.
//! - Logs and progress go to stderr; stdout carries only command output.

mod args;
mod cancellation;
mod commands;
mod config_context;
mod dispatch;
mod error;
mod formatters;
mod progress;

use args::{Cli, LogFormat};
use cancellation::{CancellationToken, is_cancelled_error, print_cancelled_message};
use clap::Parser;
use config_context::{ConfigCommandContext, load_config, needs_real_config};
use dispatch::run_command;
use error::{ExitCode, ExitCodeExt};
use fleet_client::metrics_exporter::MetricsExporter;
use fleet_config::ConfigLoader;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    // Load .env file BEFORE CLI parsing so clap env defaults can read .env values
    if let Err(e) = ConfigLoader::new().load_dotenv() {
        eprintln!("Failed to load environment: {}", e);
        std::process::exit(ExitCode::GeneralError.as_i32());
    }

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);
    match cli.log_format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }

    // Initialize metrics exporter if --metrics-bind is provided
    let _metrics_exporter = if let Some(ref bind_addr) = cli.metrics_bind {
        match MetricsExporter::install(bind_addr) {
            Ok(exporter) => {
                tracing::info!("Metrics exporter started on http://{}/metrics", bind_addr);
                Some(exporter)
            }
            Err(e) => {
                eprintln!("Failed to start metrics exporter: {}", e);
                std::process::exit(ExitCode::GeneralError.as_i32());
            }
        }
    } else {
        None
    };

    let config_context = if needs_real_config(&cli.command) {
        match load_config(&cli) {
            Ok(config) => ConfigCommandContext::Real(Box::new(config)),
            Err(e) => {
                eprintln!("{:#}", e);
                std::process::exit(e.exit_code().as_i32());
            }
        }
    } else {
        ConfigCommandContext::Placeholder
    };

    // Create cancellation token and set up signal handling
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        cancel_clone.cancel();
    });

    let exit_code = match run_command(cli, config_context, &cancel).await {
        Ok(()) => ExitCode::Success,
        Err(e) if is_cancelled_error(&e) => {
            print_cancelled_message();
            ExitCode::Interrupted
        }
        Err(e) => {
            eprintln!("{:#}", e);
            e.exit_code()
        }
    };

    std::process::exit(exit_code.as_i32());
}
