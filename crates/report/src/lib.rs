//! Fleet Report Library
//!
//! Headless reporting core for fleet telemetry: a catalog of data
//! categories, a lookup cache that turns opaque ids into names, one batched
//! query per run, and a table engine with sort, filter, pagination, CSV
//! export and chart aggregation over the active category.
//!
//! # Example
//!
//! ```rust,ignore
//! use fleet_report::{HostContext, ReportFilters, ReportSession};
//!
//! let mut session = ReportSession::new(client, defaults);
//! session.initialize(HostContext::new("cli"), || {}).await?;
//! session.select_category("Trip")?;
//! session.run_report(&ReportFilters::default(), |msg| eprintln!("{msg}")).await?;
//! ```

pub mod chart;
pub mod error;
pub mod export;
pub mod format;
pub mod key_path;
pub mod lookup;
pub mod query;
pub mod registry;
pub mod session;
pub mod table;
mod values;

// Re-export commonly used types at the crate root
pub use chart::{ChartData, ChartGroup, ChartKind, ChartRequest};
pub use error::{ReportError, Result};
pub use export::CsvExport;
pub use format::format_value;
pub use lookup::LookupCache;
pub use query::{QueryResults, QuerySelection, run_queries};
pub use registry::{CategoryDefinition, FieldDefinition, ResolverKind, ValueType};
pub use session::{HostContext, ReportFilters, ReportSession, Status};
pub use table::{PageInfo, SortDirection, SortState, TableEngine};
