//! Categories command: the offline catalog of data categories and fields.

use std::path::PathBuf;

use anyhow::Result;
use fleet_report::{ReportError, registry};

use crate::formatters::{OutputFormat, get_formatter, output_result};

pub fn run(
    category: Option<String>,
    output_format: OutputFormat,
    output_file: Option<PathBuf>,
) -> Result<()> {
    let formatter = get_formatter(output_format);

    let output = match category.as_deref() {
        Some(key) => {
            let definition = registry::category(key)
                .ok_or_else(|| ReportError::UnknownCategory(key.to_string()))?;
            formatter.format_fields(definition)?
        }
        None => formatter.format_categories(registry::categories())?,
    };

    output_result(&output, output_file.as_deref())
}
