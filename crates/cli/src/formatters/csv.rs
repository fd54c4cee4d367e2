//! CSV formatter implementation.
//!
//! Responsibilities:
//! - Format catalogs, devices and report pages as RFC 4180 CSV.
//!
//! Does NOT handle:
//! - Spreadsheet exports (byte-order mark, CRLF); `run --export-dir` writes
//!   those through `fleet_report::export`.
//! - Chart aggregates, which only the table and JSON formats carry.

use anyhow::{Context, Result};
use fleet_report::CategoryDefinition;

use crate::formatters::{DeviceEntry, Formatter, ReportOutput};

/// CSV formatter.
pub struct CsvFormatter;

fn write_records<I, R>(records: I) -> Result<String>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.write_record(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

impl Formatter for CsvFormatter {
    fn format_categories(&self, categories: &[CategoryDefinition]) -> Result<String> {
        let header = ["key", "label", "type_name", "needs_date_range", "needs_diagnostic"]
            .map(String::from)
            .to_vec();
        let rows = categories.iter().map(|c| {
            vec![
                c.key.to_string(),
                c.label.to_string(),
                c.type_name.to_string(),
                c.needs_date_range.to_string(),
                c.needs_diagnostic.to_string(),
            ]
        });
        write_records(std::iter::once(header).chain(rows))
    }

    fn format_fields(&self, category: &CategoryDefinition) -> Result<String> {
        let header = ["key", "label", "value_type", "resolver", "default_visible"]
            .map(String::from)
            .to_vec();
        let rows = category.fields.iter().map(|f| {
            vec![
                f.key.to_string(),
                f.label.to_string(),
                f.value_type.to_string(),
                f.resolver.map(|r| r.to_string()).unwrap_or_default(),
                f.default_visible.to_string(),
            ]
        });
        write_records(std::iter::once(header).chain(rows))
    }

    fn format_devices(&self, devices: &[DeviceEntry]) -> Result<String> {
        let header = vec!["id".to_string(), "name".to_string()];
        let rows = devices
            .iter()
            .map(|d| vec![d.id.clone(), d.name.clone()]);
        write_records(std::iter::once(header).chain(rows))
    }

    fn format_report(&self, report: &ReportOutput) -> Result<String> {
        let header: Vec<String> = report.columns.iter().map(|c| c.label.clone()).collect();
        write_records(std::iter::once(header).chain(report.rows.iter().cloned()))
    }
}
