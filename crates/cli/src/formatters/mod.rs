//! Output formatters for CLI commands.
//!
//! Responsibilities:
//! - Provide the table, JSON and CSV output formats.
//! - Implement the `Formatter` trait for categories, devices and report pages.
//!
//! Does NOT handle:
//! - Cell formatting (cells arrive already formatted by `fleet_report`).
//! - Direct printing to stdout (returns formatted strings).
//!
//! Invariants:
//! - Tables use tab-separation for consistent alignment in standard terminals.
//!
//! ## Empty-State Handling
//!
//! | Format | Empty State Behavior | Example |
//! |--------|---------------------|---------|
//! | JSON | Valid empty structure | `"rows": []` |
//! | CSV | Headers only, no data | `Device,Driver\n` |
//! | Table | Human message | `No results` |

use anyhow::Result;
use clap::ValueEnum;
use fleet_report::{CategoryDefinition, ChartData, PageInfo};
use serde::Serialize;

mod common;
mod csv;
mod json;
mod table;

pub use common::{output_result, write_to_file};
pub use csv::CsvFormatter;
pub use json::JsonFormatter;
pub use table::TableFormatter;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// One device of the lookup cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceEntry {
    pub id: String,
    pub name: String,
}

/// Column of a report page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnOutput {
    pub key: String,
    pub label: String,
}

/// Row count of one queried category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabOutput {
    pub key: String,
    pub label: String,
    pub count: usize,
}

/// Everything a report run shows: tabs, one page of the active tab, and an
/// optional chart aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutput {
    pub status: String,
    pub tabs: Vec<TabOutput>,
    pub category: Option<String>,
    pub filter: String,
    pub columns: Vec<ColumnOutput>,
    /// Formatted cells, one `Vec` per row, in column order.
    pub rows: Vec<Vec<String>>,
    pub page: PageInfo,
    pub chart: Option<ChartData>,
}

/// Formatter trait for different output types.
pub trait Formatter {
    /// Format the category catalog.
    fn format_categories(&self, categories: &[CategoryDefinition]) -> Result<String>;

    /// Format the fields of one category.
    fn format_fields(&self, category: &CategoryDefinition) -> Result<String>;

    /// Format the device list.
    fn format_devices(&self, devices: &[DeviceEntry]) -> Result<String>;

    /// Format one report page.
    fn format_report(&self, report: &ReportOutput) -> Result<String>;
}

/// Get a formatter for the specified format.
pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use fleet_report::{ChartGroup, ChartKind};

    pub(crate) fn sample_report() -> ReportOutput {
        ReportOutput {
            status: "Done — 2 records loaded.".to_string(),
            tabs: vec![TabOutput {
                key: "Trip".to_string(),
                label: "Trips".to_string(),
                count: 2,
            }],
            category: Some("Trip".to_string()),
            filter: String::new(),
            columns: vec![
                ColumnOutput {
                    key: "device.id".to_string(),
                    label: "Device".to_string(),
                },
                ColumnOutput {
                    key: "distance".to_string(),
                    label: "Distance (km)".to_string(),
                },
            ],
            rows: vec![
                vec!["Truck 12".to_string(), "182.46".to_string()],
                vec!["Van, north".to_string(), "12".to_string()],
            ],
            page: PageInfo {
                start: 1,
                end: 2,
                total: 2,
                page: 0,
                page_count: 1,
            },
            chart: Some(ChartData {
                kind: ChartKind::Bar,
                value_field: "distance".to_string(),
                group_field: "device.id".to_string(),
                groups: vec![ChartGroup {
                    label: "Truck 12".to_string(),
                    sum: 182.456,
                    count: 1,
                }],
            }),
        }
    }

    #[test]
    fn test_output_format_values() {
        assert_eq!(
            OutputFormat::from_str("JSON", true).unwrap(),
            OutputFormat::Json
        );
        assert!(OutputFormat::from_str("xml", true).is_err());
    }
}
