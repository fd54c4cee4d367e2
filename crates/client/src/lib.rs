//! Fleet telemetry API client.
//!
//! This crate provides the remote data source used by the reporting core:
//! a [`DataSource`] trait describing the single positional batch capability
//! the core depends on, and [`FleetClient`], a JSON-RPC implementation that
//! sends every batch as one `ExecuteMultiCall` request.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod metrics;
pub mod metrics_exporter;
pub mod models;
mod source;

#[cfg(any(feature = "test-utils", test))]
pub mod testing;

pub use client::FleetClient;
pub use client::builder::FleetClientBuilder;
pub use error::{ClientError, Result};
pub use metrics::{ErrorCategory, MetricsCollector};
pub use models::{ApiCall, GetParams, IdRef, SearchFilter};
pub use source::DataSource;
