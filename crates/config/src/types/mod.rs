//! Configuration type definitions for Fleet Reporter.
//!
//! Responsibilities:
//! - Define connection settings, API session credentials and report defaults.
//! - Provide serialization helpers for durations.
//!
//! Does NOT handle:
//! - Loading configuration from files or environment variables (see `loader`).
//! - Obtaining credentials; an already issued session is passed through as-is.
//!
//! Invariants:
//! - The session id is held in a `secrecy::SecretString` and never printed by `Debug`.

mod connection;
mod credentials;
mod report;

pub use connection::{Config, ConnectionConfig};
pub use credentials::Credentials;
pub use report::ReportDefaults;
