//! Command dispatch logic.
//!
//! Responsibilities:
//! - Route parsed CLI arguments to appropriate command handlers.
//! - Hand each remote command its validated configuration.
//!
//! Does NOT handle:
//! - CLI structure definitions (see `args` module).
//! - Configuration loading (see `config_context`).
//!
//! Invariants:
//! - All commands receive a valid cancellation token.
//! - Offline commands never touch the config context.

use anyhow::Result;

use crate::args::{Cli, Commands};
use crate::cancellation::CancellationToken;
use crate::commands;
use crate::config_context::ConfigCommandContext;

/// Dispatch CLI commands to their respective handlers.
pub(crate) async fn run_command(
    cli: Cli,
    config: ConfigCommandContext,
    cancel_token: &CancellationToken,
) -> Result<()> {
    match cli.command {
        Commands::Categories { category } => {
            commands::categories::run(category, cli.output, cli.output_file)?;
        }
        Commands::Devices => {
            let config = config.into_real_config()?;
            commands::devices::run(
                config,
                cli.output,
                cli.quiet,
                cli.output_file,
                cancel_token,
            )
            .await?;
        }
        Commands::Run(args) => {
            let config = config.into_real_config()?;
            commands::run::run(
                config,
                args,
                cli.output,
                cli.quiet,
                cli.output_file,
                cancel_token,
            )
            .await?;
        }
    }

    Ok(())
}
