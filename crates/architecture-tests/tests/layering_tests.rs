//! Architecture tests for crate layering.
//!
//! Invariants:
//! - config depends on no workspace crate; client only on config; report
//!   on client and config; only the CLI depends on report.
//! - Library crates never write to stdout; stdout belongs to command output.

mod common;

use std::fs;

const LIBRARY_CRATES: &[&str] = &["config", "client", "report"];

fn manifest(crate_dir: &str) -> String {
    let path = common::workspace_root()
        .join("crates")
        .join(crate_dir)
        .join("Cargo.toml");
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

/// Workspace crates named in the `[dependencies]` table only.
fn workspace_dependencies(crate_dir: &str) -> Vec<&'static str> {
    let content = manifest(crate_dir);
    let dependencies = content
        .split("[dependencies]")
        .nth(1)
        .and_then(|rest| rest.split("\n[").next())
        .unwrap_or_default()
        .to_string();

    ["fleet-config", "fleet-client", "fleet-report", "fleet-cli"]
        .into_iter()
        .filter(|name| {
            dependencies
                .lines()
                .any(|line| line.trim_start().starts_with(&format!("{name} ")))
        })
        .collect()
}

#[test]
fn test_dependency_direction() {
    assert_eq!(workspace_dependencies("config"), Vec::<&str>::new());
    assert_eq!(workspace_dependencies("client"), vec!["fleet-config"]);
    assert_eq!(
        workspace_dependencies("report"),
        vec!["fleet-config", "fleet-client"]
    );
    assert_eq!(
        workspace_dependencies("cli"),
        vec!["fleet-config", "fleet-client", "fleet-report"]
    );
}

#[test]
fn test_libraries_do_not_print_to_stdout() {
    let root = common::workspace_root().join("crates");
    let mut violations = Vec::new();

    for crate_dir in LIBRARY_CRATES {
        for path in common::rust_files(&root.join(crate_dir).join("src")) {
            let content = fs::read_to_string(&path).unwrap_or_default();
            for (i, line) in content.lines().enumerate() {
                let trimmed = line.trim_start();
                if trimmed.starts_with("//") {
                    continue;
                }
                let prints = (trimmed.contains("println!(") && !trimmed.contains("eprintln!("))
                    || trimmed.starts_with("print!(");
                if prints {
                    violations.push(format!("{}:{}", path.display(), i + 1));
                }
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Library crates must log through tracing instead of printing:\n{}",
        violations.join("\n")
    );
}
