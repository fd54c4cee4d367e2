//! Common utilities for formatters.
//!
//! Responsibilities:
//! - Atomic file writing.
//! - Routing formatted output to stdout or a file.
//!
//! Does NOT handle:
//! - Format-specific logic (lives in respective formatter modules).

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

/// Print `output`, or write it to `output_file` when one is given.
pub fn output_result(output: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        write_to_file(output, path)
            .with_context(|| format!("Failed to write output to {}", path.display()))?;
        eprintln!("Results written to {}", path.display());
    } else {
        print!("{}", output);
    }
    Ok(())
}

/// Write content to a file atomically.
///
/// Creates parent directories if needed, writes to temp file then renames
/// for atomicity.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    // A bare file name has an empty parent; use the current directory.
    let parent_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    if parent_dir != Path::new(".") {
        fs::create_dir_all(parent_dir)
            .with_context(|| format!("Failed to create directory: {}", parent_dir.display()))?;
    }

    let mut temp_file = NamedTempFile::new_in(parent_dir)
        .with_context(|| format!("Failed to create temp file in: {}", parent_dir.display()))?;

    temp_file
        .write_all(content.as_bytes())
        .context("Failed to write to temp file")?;
    temp_file.flush().context("Failed to flush temp file")?;

    temp_file
        .persist(path)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_to_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/report.csv");

        write_to_file("a,b\r\n", &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\r\n");
    }

    #[test]
    fn test_write_to_file_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        fs::write(&path, "old").unwrap();

        write_to_file("new", &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }
}
