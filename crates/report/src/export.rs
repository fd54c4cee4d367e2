//! CSV export of the visible fields of a row set.
//!
//! Responsibilities:
//! - Produce spreadsheet-friendly CSV text: UTF-8 with a byte-order mark,
//!   a header row of field labels, rows separated by CRLF with no trailing
//!   terminator.
//! - Format every cell with [`format_value`] so exported text equals
//!   displayed text.
//! - Derive a timestamped, filesystem-safe filename.
//!
//! Does NOT handle:
//! - Writing to disk (the caller owns the destination and atomicity).
//! - Choosing which rows to export; callers pass the table's filtered view.

use chrono::{DateTime, TimeZone};
use serde_json::Value;

use crate::error::{ReportError, Result};
use crate::format::format_value;
use crate::key_path::resolve_path;
use crate::lookup::LookupCache;
use crate::registry::FieldDefinition;

const BYTE_ORDER_MARK: &str = "\u{FEFF}";
const DEFAULT_BASE: &str = "export";
const LINE_SEPARATOR: &str = "\r\n";

/// A rendered CSV document and its suggested filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
    /// Data rows written, excluding the header.
    pub row_count: usize,
}

/// Render `rows` under `fields` as CSV.
pub fn export_csv<'a, Tz: TimeZone>(
    base: &str,
    fields: &[FieldDefinition],
    rows: impl IntoIterator<Item = &'a Value>,
    lookups: &LookupCache,
    now: &DateTime<Tz>,
) -> Result<CsvExport>
where
    Tz::Offset: std::fmt::Display,
{
    if fields.is_empty() {
        return Err(ReportError::Validation(
            "Select at least one column to export.".to_string(),
        ));
    }

    let mut lines = vec![csv_line(fields.iter().map(|f| f.label))];
    for row in rows {
        lines.push(csv_line(
            fields
                .iter()
                .map(|field| format_value(resolve_path(row, field.key), field, lookups)),
        ));
    }
    let row_count = lines.len() - 1;

    Ok(CsvExport {
        filename: csv_filename(base, now),
        content: format!("{BYTE_ORDER_MARK}{}", lines.join(LINE_SEPARATOR)),
        row_count,
    })
}

/// Join escaped cells with commas. A lone empty cell stays an empty line.
fn csv_line<S: AsRef<str>>(cells: impl IntoIterator<Item = S>) -> String {
    cells
        .into_iter()
        .map(|cell| escape_cell(cell.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Quote cells holding a comma, quote or line break; double inner quotes.
pub fn escape_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// `<sanitized base>_<YYYYMMDD>_<HHmm>.csv`; characters outside
/// `[A-Za-z0-9_-]` become `_` and an empty base becomes `export`.
pub fn csv_filename<Tz: TimeZone>(base: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let base = if base.is_empty() { DEFAULT_BASE } else { base };
    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}_{}.csv", sanitized, now.format("%Y%m%d_%H%M"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ValueType;
    use chrono::Utc;
    use serde_json::json;

    fn text_field(key: &'static str, label: &'static str) -> FieldDefinition {
        FieldDefinition {
            key,
            label,
            default_visible: true,
            value_type: ValueType::String,
            resolver: None,
        }
    }

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 9, 7, 0).unwrap()
    }

    #[test]
    fn test_filename() {
        assert_eq!(
            csv_filename("Engine / Status Data", &stamp()),
            "Engine___Status_Data_20240305_0907.csv"
        );
        assert_eq!(csv_filename("", &stamp()), "export_20240305_0907.csv");
        assert_eq!(csv_filename("HOS-log_2", &stamp()), "HOS-log_2_20240305_0907.csv");
    }

    #[test]
    fn test_bom_crlf_and_escaping() {
        let fields = [text_field("note", "Note"), text_field("id", "Id")];
        let rows = [json!({"note": "He said \"hi\", ok", "id": "a1"})];

        let export = export_csv("Trips", &fields, &rows, &LookupCache::new(), &stamp()).unwrap();

        assert_eq!(
            export.content,
            "\u{FEFF}Note,Id\r\n\"He said \"\"hi\"\", ok\",a1"
        );
        assert_eq!(export.row_count, 1);
        assert_eq!(export.filename, "Trips_20240305_0907.csv");
    }

    #[test]
    fn test_newlines_are_quoted() {
        let fields = [text_field("note", "Note"), text_field("id", "Id")];
        let rows = [json!({"note": "line1\nline2", "id": "a\rb"})];
        let export = export_csv("x", &fields, &rows, &LookupCache::new(), &stamp()).unwrap();
        assert!(export.content.ends_with("\"line1\nline2\",\"a\rb\""));
    }

    #[test]
    fn test_single_empty_column_is_a_bare_line() {
        let fields = [text_field("comment", "Comment")];
        let rows = [json!({"comment": ""}), json!({"comment": "x"}), json!({})];
        let export = export_csv("x", &fields, &rows, &LookupCache::new(), &stamp()).unwrap();
        assert_eq!(export.content, "\u{FEFF}Comment\r\n\r\nx\r\n");
        assert_eq!(export.row_count, 3);
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell(""), "");
        assert_eq!(escape_cell("plain text"), "plain text");
        assert_eq!(escape_cell("a,b"), "\"a,b\"");
        assert_eq!(escape_cell("say \"x\""), "\"say \"\"x\"\"\"");
        assert_eq!(escape_cell("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_no_fields_is_rejected() {
        let rows: [Value; 0] = [];
        let err = export_csv("x", &[], &rows, &LookupCache::new(), &stamp()).unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));
    }
}
