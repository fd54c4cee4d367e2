//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Parse command-line arguments and environment variables.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `dispatch` module).
//! - Does not validate configuration (see `fleet_config::ConfigLoader`).

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use fleet_report::ChartKind;

use crate::formatters::OutputFormat;

#[derive(Parser)]
#[command(name = "fleet-cli")]
#[command(about = "Fleet CLI - Query and export fleet telemetry reports", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  fleet-cli categories\n  fleet-cli categories --category Trip\n  fleet-cli devices\n  fleet-cli run Trip FaultData --from 2024-03-01 --to 2024-03-07\n  fleet-cli run Trip --filter truck --sort-by distance --desc\n  fleet-cli run StatusData --diagnostic DiagnosticEngineSpeedId --export-dir ./out\n  fleet-cli -o json run Trip --chart-value distance --chart-group device.id\n"
)]
pub struct Cli {
    /// Base URL of the telemetry server (e.g., https://my.fleet.example.com)
    #[arg(short, long, global = true, env = "FLEET_SERVER_URL")]
    pub server_url: Option<String>,

    /// Database (tenant) name of the API session
    #[arg(short, long, global = true, env = "FLEET_DATABASE")]
    pub database: Option<String>,

    /// User name of the API session
    #[arg(short, long, global = true, env = "FLEET_USERNAME")]
    pub username: Option<String>,

    /// Session id of an already authenticated API session
    #[arg(long, global = true, env = "FLEET_SESSION_ID", hide_env_values = true)]
    pub session_id: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "FLEET_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Maximum number of retries for rate-limited or unavailable responses
    #[arg(long, global = true, env = "FLEET_MAX_RETRIES")]
    pub max_retries: Option<usize>,

    /// Skip TLS certificate verification (for self-signed certificates)
    #[arg(long, global = true, env = "FLEET_SKIP_VERIFY")]
    pub skip_verify: bool,

    /// Path to a JSON configuration file.
    ///
    /// Can also be set via FLEET_CONFIG_PATH environment variable.
    #[arg(long, global = true, env = "FLEET_CONFIG_PATH", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Output file path (saves results to file instead of stdout)
    #[arg(long, global = true, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Suppress all progress output (spinners).
    ///
    /// Note: Progress indicators always write to STDERR; this flag disables them entirely.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Log line format on stderr (filter with RUST_LOG)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Expose Prometheus metrics on this address (e.g., 127.0.0.1:9090)
    #[arg(long, global = true, value_name = "ADDR")]
    pub metrics_bind: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the data categories (offline)
    Categories {
        /// Show the fields of one category instead
        #[arg(short, long, value_name = "KEY")]
        category: Option<String>,
    },

    /// List devices from the lookup cache, sorted by name
    Devices,

    /// Run a report over one or more data categories
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Category keys to query (e.g., Trip FaultData); see `categories`
    #[arg(required = true, value_name = "CATEGORY")]
    pub categories: Vec<String>,

    /// First day of the report window (local date, inclusive)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub from: Option<NaiveDate>,

    /// Last day of the report window (local date, inclusive)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub to: Option<NaiveDate>,

    /// Restrict every category to one device id
    #[arg(long, value_name = "ID")]
    pub device: Option<String>,

    /// Diagnostic id, required for StatusData
    #[arg(long, value_name = "ID")]
    pub diagnostic: Option<String>,

    /// Maximum rows per category
    #[arg(short, long, env = "FLEET_RESULTS_LIMIT")]
    pub limit: Option<u32>,

    /// Visible fields of a category, as CATEGORY=key,key (repeatable)
    #[arg(long = "fields", value_name = "CATEGORY=KEYS")]
    pub fields: Vec<String>,

    /// Category to show (defaults to the first one queried)
    #[arg(long, value_name = "CATEGORY")]
    pub tab: Option<String>,

    /// Keep rows whose displayed text contains this (case-insensitive)
    #[arg(long, value_name = "TEXT")]
    pub filter: Option<String>,

    /// Sort by this field key
    #[arg(long, value_name = "KEY")]
    pub sort_by: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort_by")]
    pub desc: bool,

    /// Page to show (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page
    #[arg(long, env = "FLEET_PAGE_SIZE")]
    pub page_size: Option<usize>,

    /// Write a CSV export of the filtered rows into this directory
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Field key summed per chart group
    #[arg(long, value_name = "KEY")]
    pub chart_value: Option<String>,

    /// Field key that groups chart rows
    #[arg(long, value_name = "KEY")]
    pub chart_group: Option<String>,

    /// Chart presentation (bar, line, pie)
    #[arg(long, default_value = "bar")]
    pub chart_kind: ChartKind,

    /// Chart groups kept before the rest collapse into "Others"
    #[arg(long)]
    pub max_groups: Option<usize>,
}

impl RunArgs {
    /// True when any chart option was given.
    pub fn wants_chart(&self) -> bool {
        self.chart_value.is_some() || self.chart_group.is_some()
    }
}
