//! JSON formatter implementation.
//!
//! Report rows are emitted as objects keyed by field key, holding the same
//! formatted text the table shows.

use anyhow::Result;
use fleet_report::CategoryDefinition;
use serde_json::{Map, Value, json};

use crate::formatters::{DeviceEntry, Formatter, ReportOutput};

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_categories(&self, categories: &[CategoryDefinition]) -> Result<String> {
        Ok(format!("{}\n", serde_json::to_string_pretty(categories)?))
    }

    fn format_fields(&self, category: &CategoryDefinition) -> Result<String> {
        Ok(format!("{}\n", serde_json::to_string_pretty(category)?))
    }

    fn format_devices(&self, devices: &[DeviceEntry]) -> Result<String> {
        Ok(format!("{}\n", serde_json::to_string_pretty(devices)?))
    }

    fn format_report(&self, report: &ReportOutput) -> Result<String> {
        let rows: Vec<Value> = report
            .rows
            .iter()
            .map(|row| {
                let object: Map<String, Value> = report
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(column, text)| (column.key.clone(), Value::String(text.clone())))
                    .collect();
                Value::Object(object)
            })
            .collect();

        let document = json!({
            "status": report.status,
            "tabs": report.tabs,
            "category": report.category,
            "filter": report.filter,
            "columns": report.columns,
            "rows": rows,
            "page": report.page,
            "chart": report.chart,
        });
        Ok(format!("{}\n", serde_json::to_string_pretty(&document)?))
    }
}
