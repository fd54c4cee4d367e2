//! Table formatter implementation.
//!
//! Responsibilities:
//! - Format catalogs, devices and report pages as tab-separated tables.
//! - Append the pagination footer and chart aggregate to report pages.
//!
//! Does NOT handle:
//! - Other output formats.
//! - File I/O.

use anyhow::Result;
use fleet_report::CategoryDefinition;

use crate::formatters::{DeviceEntry, Formatter, ReportOutput};

/// Table formatter.
pub struct TableFormatter;

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

/// Tabs and newlines inside a cell would break the layout.
fn cell(text: &str) -> String {
    text.replace(['\t', '\n', '\r'], " ")
}

impl Formatter for TableFormatter {
    fn format_categories(&self, categories: &[CategoryDefinition]) -> Result<String> {
        if categories.is_empty() {
            return Ok("No categories found.\n".to_string());
        }

        let mut output = String::from("Key\tLabel\tType\tDate Range\tDiagnostic\tFields\n");
        for category in categories {
            output.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\n",
                category.key,
                category.label,
                category.type_name,
                yes_no(category.needs_date_range),
                yes_no(category.needs_diagnostic),
                category.fields.len()
            ));
        }
        Ok(output)
    }

    fn format_fields(&self, category: &CategoryDefinition) -> Result<String> {
        let mut output = format!("{} ({})\n", category.label, category.key);
        output.push_str("Key\tLabel\tType\tResolver\tDefault\n");
        for field in category.fields {
            output.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\n",
                field.key,
                field.label,
                field.value_type,
                field.resolver.map(|r| r.as_str()).unwrap_or("-"),
                yes_no(field.default_visible)
            ));
        }
        Ok(output)
    }

    fn format_devices(&self, devices: &[DeviceEntry]) -> Result<String> {
        if devices.is_empty() {
            return Ok("No devices found.\n".to_string());
        }

        let mut output = String::from("ID\tName\n");
        for device in devices {
            output.push_str(&format!("{}\t{}\n", device.id, cell(&device.name)));
        }
        Ok(output)
    }

    fn format_report(&self, report: &ReportOutput) -> Result<String> {
        let mut output = String::new();

        if !report.tabs.is_empty() {
            let tabs: Vec<String> = report
                .tabs
                .iter()
                .map(|tab| {
                    let marker = if report.category.as_deref() == Some(tab.key.as_str()) {
                        "*"
                    } else {
                        ""
                    };
                    format!("{}{} ({})", marker, tab.label, tab.count)
                })
                .collect();
            output.push_str(&tabs.join("  "));
            output.push_str("\n\n");
        }

        if report.rows.is_empty() {
            output.push_str(&format!("{}\n", report.page));
        } else {
            let header: Vec<String> = report.columns.iter().map(|c| cell(&c.label)).collect();
            output.push_str(&header.join("\t"));
            output.push('\n');
            for row in &report.rows {
                let cells: Vec<String> = row.iter().map(|c| cell(c)).collect();
                output.push_str(&cells.join("\t"));
                output.push('\n');
            }
            output.push_str(&format!(
                "\n{} (page {} of {})\n",
                report.page,
                report.page.page + 1,
                report.page.page_count
            ));
        }

        if let Some(chart) = &report.chart {
            output.push_str(&format!(
                "\nChart ({}): sum of {} by {}\n",
                chart.kind, chart.value_field, chart.group_field
            ));
            output.push_str("Group\tSum\tCount\n");
            for group in &chart.groups {
                output.push_str(&format!(
                    "{}\t{}\t{}\n",
                    cell(&group.label),
                    format_sum(group.sum),
                    group.count
                ));
            }
        }

        Ok(output)
    }
}

/// Sums print with two decimals unless they are whole.
fn format_sum(sum: f64) -> String {
    if sum.fract() == 0.0 && sum.abs() < 1e15 {
        format!("{}", sum as i64)
    } else {
        format!("{sum:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatters::tests::sample_report;
    use fleet_report::registry;

    #[test]
    fn test_report_table_layout() {
        let output = TableFormatter.format_report(&sample_report()).unwrap();

        assert!(output.starts_with("*Trips (2)\n\n"));
        assert!(output.contains("Device\tDistance (km)\nTruck 12\t182.46\nVan, north\t12\n"));
        assert!(output.contains("Showing 1 - 2 of 2 (page 1 of 1)"));
        assert!(output.contains("Chart (bar): sum of distance by device.id"));
        assert!(output.contains("Truck 12\t182.46\t1\n"));
    }

    #[test]
    fn test_empty_report_says_no_results() {
        let mut report = sample_report();
        report.rows.clear();
        report.chart = None;
        report.page = fleet_report::PageInfo {
            start: 0,
            end: 0,
            total: 0,
            page: 0,
            page_count: 0,
        };

        let output = TableFormatter.format_report(&report).unwrap();

        assert!(output.ends_with("No results\n"));
    }

    #[test]
    fn test_categories_table() {
        let output = TableFormatter
            .format_categories(registry::categories())
            .unwrap();
        assert!(output.contains("StatusData\tEngine / Status Data\tStatusData\tyes\tyes\t"));
        assert!(output.contains("Zone\tZones\tZone\tno\tno\t"));
    }

    #[test]
    fn test_cells_cannot_break_rows() {
        let devices = [DeviceEntry {
            id: "b1".to_string(),
            name: "Truck\t12\nnorth".to_string(),
        }];
        let output = TableFormatter.format_devices(&devices).unwrap();
        assert_eq!(output, "ID\tName\nb1\tTruck 12 north\n");
    }

    #[test]
    fn test_format_sum() {
        assert_eq!(format_sum(150.0), "150");
        assert_eq!(format_sum(182.456), "182.46");
    }
}
