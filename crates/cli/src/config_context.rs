//! Configuration context for command execution.
//!
//! Responsibilities:
//! - Layer the config file, environment and CLI flags into a validated `Config`.
//! - Distinguish between real and placeholder configs at the type level.
//!
//! Does NOT handle:
//! - `.env` loading (done in `main()` before parsing so clap env defaults see it).
//! - CLI argument definitions (see `args` module).
//!
//! Invariants:
//! - Precedence, lowest to highest: config file, environment, CLI flags.
//! - Placeholder configs cannot be used for remote calls.

use std::time::Duration;

use anyhow::{Context, Result};
use fleet_config::{Config, ConfigLoader};

use crate::args::{Cli, Commands};

/// Context for command execution, distinguishing between real and placeholder configs.
pub(crate) enum ConfigCommandContext {
    /// A validated config with server URL and session credentials.
    Real(Box<Config>),
    /// For offline commands that never reach the server.
    Placeholder,
}

impl ConfigCommandContext {
    /// Extract the real config, failing if this is a placeholder.
    pub(crate) fn into_real_config(self) -> Result<Config> {
        match self {
            ConfigCommandContext::Real(config) => Ok(*config),
            ConfigCommandContext::Placeholder => {
                anyhow::bail!(
                    "Internal error: attempted to use placeholder config for an operation requiring real connection details"
                )
            }
        }
    }
}

/// True for commands that talk to the server.
pub(crate) fn needs_real_config(command: &Commands) -> bool {
    !matches!(command, Commands::Categories { .. })
}

/// Build the config for `cli`.
pub(crate) fn load_config(cli: &Cli) -> Result<Config> {
    let mut loader = ConfigLoader::new();

    // Blank/whitespace-only paths fall back to FLEET_CONFIG_PATH.
    if let Some(path) = &cli.config_path
        && !path.to_string_lossy().trim().is_empty()
    {
        loader = loader.with_config_path(path.clone());
    }

    loader = loader
        .from_file()
        .context("Failed to load configuration file")?
        .from_env()
        .context("Failed to load configuration from environment")?;

    if let Some(url) = &cli.server_url {
        loader = loader.with_server_url(url.clone());
    }
    if let Some(database) = &cli.database {
        loader = loader.with_database(database.clone());
    }
    if let Some(username) = &cli.username {
        loader = loader.with_username(username.clone());
    }
    if let Some(session_id) = &cli.session_id {
        loader = loader.with_session_id(session_id.clone());
    }
    if let Some(timeout_secs) = cli.timeout {
        loader = loader.with_timeout(Duration::from_secs(timeout_secs));
    }
    if let Some(retries) = cli.max_retries {
        loader = loader.with_max_retries(retries);
    }
    if cli.skip_verify {
        loader = loader.with_skip_verify(true);
    }
    if let Commands::Run(args) = &cli.command {
        if let Some(limit) = args.limit {
            loader = loader.with_results_limit(limit);
        }
        if let Some(size) = args.page_size {
            loader = loader.with_page_size(size);
        }
    }

    loader.build().context("Failed to build configuration")
}
