//! Integration tests for layered configuration loading.
//!
//! These tests verify the precedence chain used by the CLI:
//! builder overrides > env vars > config file > defaults.
//!
//! Invariants / Assumptions:
//! - Every test that reads `FLEET_*` variables is `#[serial]` and scopes them
//!   with `temp_env` so the process environment is restored afterwards.

use std::io::Write;
use std::time::Duration;

use fleet_config::constants::{DEFAULT_RESULTS_LIMIT, MAX_RESULTS_LIMIT};
use fleet_config::{ConfigError, ConfigLoader, env_var_or_none};
use serial_test::serial;

const FLEET_VARS: [&str; 10] = [
    "FLEET_SERVER_URL",
    "FLEET_DATABASE",
    "FLEET_USERNAME",
    "FLEET_SESSION_ID",
    "FLEET_SKIP_VERIFY",
    "FLEET_TIMEOUT",
    "FLEET_MAX_RETRIES",
    "FLEET_RESULTS_LIMIT",
    "FLEET_PAGE_SIZE",
    "FLEET_CONFIG_PATH",
];

/// Run `f` with every `FLEET_*` variable unset except those in `set`.
fn with_fleet_env<F: FnOnce()>(set: &[(&str, &str)], f: F) {
    let vars: Vec<(&str, Option<&str>)> = FLEET_VARS
        .iter()
        .map(|name| {
            let value = set.iter().find(|(k, _)| k == name).map(|(_, v)| *v);
            (*name, value)
        })
        .collect();
    temp_env::with_vars(vars, f);
}

fn write_config(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_env_supplies_full_config() {
    with_fleet_env(
        &[
            ("FLEET_SERVER_URL", "https://my.fleet.example.com"),
            ("FLEET_DATABASE", "acme"),
            ("FLEET_USERNAME", "ops@acme.test"),
            ("FLEET_SESSION_ID", "sess-1"),
            ("FLEET_TIMEOUT", "12"),
            ("FLEET_RESULTS_LIMIT", "1000"),
        ],
        || {
            let config = ConfigLoader::new().from_env().unwrap().build().unwrap();
            assert_eq!(config.connection.server_url, "https://my.fleet.example.com");
            assert_eq!(config.connection.timeout, Duration::from_secs(12));
            assert_eq!(config.credentials.user_name, "ops@acme.test");
            assert_eq!(config.report.results_limit, 1000);
        },
    );
}

#[test]
#[serial]
fn test_builder_overrides_env() {
    with_fleet_env(
        &[
            ("FLEET_SERVER_URL", "https://env.example.com"),
            ("FLEET_DATABASE", "acme"),
            ("FLEET_USERNAME", "ops"),
            ("FLEET_SESSION_ID", "sess-1"),
        ],
        || {
            let config = ConfigLoader::new()
                .from_env()
                .unwrap()
                .with_server_url("https://cli.example.com".to_string())
                .build()
                .unwrap();
            assert_eq!(config.connection.server_url, "https://cli.example.com");
        },
    );
}

#[test]
#[serial]
fn test_env_overrides_file() {
    let file = write_config(
        r#"{
            "server_url": "https://file.example.com",
            "database": "from_file",
            "username": "file-user",
            "session_id": "file-session",
            "page_size": 25
        }"#,
    );
    let path = file.path().to_string_lossy().to_string();

    with_fleet_env(
        &[
            ("FLEET_CONFIG_PATH", path.as_str()),
            ("FLEET_DATABASE", "from_env"),
        ],
        || {
            let config = ConfigLoader::new()
                .from_file()
                .unwrap()
                .from_env()
                .unwrap()
                .build()
                .unwrap();
            assert_eq!(config.connection.server_url, "https://file.example.com");
            assert_eq!(config.credentials.database, "from_env");
            assert_eq!(config.report.page_size, 25);
        },
    );
}

#[test]
#[serial]
fn test_missing_config_file_is_error() {
    with_fleet_env(&[], || {
        let err = ConfigLoader::new()
            .with_config_path("/nonexistent/fleet/config.json".into())
            .from_file()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ConfigFileRead { .. }));
    });
}

#[test]
#[serial]
fn test_no_config_path_is_fine() {
    with_fleet_env(&[], || {
        let loader = ConfigLoader::new().from_file().unwrap();
        let defaults = loader.build_report_defaults().unwrap();
        assert_eq!(defaults.results_limit, DEFAULT_RESULTS_LIMIT);
    });
}

#[test]
#[serial]
fn test_results_limit_env_above_cap_is_clamped() {
    with_fleet_env(&[("FLEET_RESULTS_LIMIT", "900000")], || {
        let defaults = ConfigLoader::new()
            .from_env()
            .unwrap()
            .build_report_defaults()
            .unwrap();
        assert_eq!(defaults.results_limit, MAX_RESULTS_LIMIT);
    });
}

#[test]
#[serial]
fn test_invalid_skip_verify_env() {
    with_fleet_env(&[("FLEET_SKIP_VERIFY", "maybe")], || {
        let err = ConfigLoader::new().from_env().unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { ref var, .. } if var == "FLEET_SKIP_VERIFY")
        );
    });
}

#[test]
#[serial]
fn test_dotenv_disabled_is_noop() {
    temp_env::with_vars([("DOTENV_DISABLED", Some("1"))], || {
        assert!(ConfigLoader::new().load_dotenv().is_ok());
    });
}

#[test]
#[serial]
fn test_env_var_or_none_exported() {
    with_fleet_env(&[("FLEET_DATABASE", "  acme  ")], || {
        assert_eq!(env_var_or_none("FLEET_DATABASE").as_deref(), Some("acme"));
        assert_eq!(env_var_or_none("FLEET_USERNAME"), None);
    });
}
