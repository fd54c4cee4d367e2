//! Purpose: Enforce deterministic temp file cleanup patterns in tests.
//!
//! Ensures all temp file creation uses the tempfile crate's RAII types
//! rather than std::env::temp_dir() with manual cleanup.
//!
//! Invariants:
//! - No hardcoded /tmp paths allowed in tests
//! - tempfile handles are bound to a named variable

mod common;

use std::fs;

#[test]
fn test_no_manual_temp_dir_usage() {
    let mut violations: Vec<String> = Vec::new();

    for path in common::rust_files(&common::workspace_root().join("crates")) {
        let content = fs::read_to_string(&path).unwrap_or_default();
        if !content.contains("#[test]") && !content.contains("#[tokio::test]") {
            continue;
        }

        if content.contains("std::env::temp_dir()") {
            violations.push(format!(
                "{}: uses std::env::temp_dir() - prefer tempfile::tempdir() for RAII cleanup",
                path.display()
            ));
        }
        if content.contains("\"/tmp") {
            violations.push(format!(
                "{}: contains hardcoded /tmp path - prefer tempfile crate",
                path.display()
            ));
        }
    }

    assert!(
        violations.is_empty(),
        "Found manual temp file patterns (not panic-safe):\n{}",
        violations.join("\n")
    );
}

#[test]
fn test_tempfile_bindings_retained() {
    let mut violations: Vec<String> = Vec::new();

    for path in common::rust_files(&common::workspace_root().join("crates")) {
        if !common::is_test_path(&path) {
            continue;
        }
        let content = fs::read_to_string(&path).unwrap_or_default();

        for (i, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.starts_with("let _ = tempfile::") || trimmed.starts_with("let _ = NamedTempFile")
            {
                violations.push(format!(
                    "{}:{}: tempfile instance bound to `_` - use a named variable for RAII cleanup",
                    path.display(),
                    i + 1
                ));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Found tempfile instances not properly retained:\n{}",
        violations.join("\n")
    );
}
