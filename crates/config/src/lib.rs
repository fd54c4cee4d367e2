//! Configuration management for Fleet Reporter.
//!
//! This crate provides the named constants shared by every crate, the
//! configuration types, and a layered loader that merges a JSON config
//! file, a `.env` file, environment variables, and explicit overrides.

pub mod constants;
mod loader;
pub mod types;

pub use loader::{ConfigError, ConfigLoader, env_var_or_none};
pub use types::{Config, ConnectionConfig, Credentials, ReportDefaults};
