//! JSON config file loading.
//!
//! Responsibilities:
//! - Read the optional JSON config file and apply its values to a ConfigLoader.
//!
//! Does NOT handle:
//! - Environment variables (see env.rs).
//! - Creating or migrating config files.
//!
//! Invariants:
//! - A configured path that does not exist is an error; no path at all is not.
//! - Unknown keys are rejected so typos surface instead of being ignored.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use super::builder::ConfigLoader;
use super::error::ConfigError;

/// On-disk config file shape. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub server_url: Option<String>,
    pub database: Option<String>,
    pub username: Option<String>,
    pub session_id: Option<String>,
    pub skip_verify: Option<bool>,
    pub timeout_seconds: Option<u64>,
    pub max_retries: Option<usize>,
    pub results_limit: Option<u32>,
    pub page_size: Option<usize>,
    pub max_chart_groups: Option<usize>,
    pub lookback_days: Option<u32>,
}

pub(crate) fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|_| ConfigError::ConfigFileRead {
        path: path.to_path_buf(),
    })?;
    serde_json::from_str(&content).map_err(|_| ConfigError::ConfigFileParse {
        path: path.to_path_buf(),
    })
}

/// Apply the config file (if a path is configured) to the loader.
pub fn apply_file(loader: &mut ConfigLoader) -> Result<(), ConfigError> {
    let Some(path) = loader.config_path().cloned() else {
        return Ok(());
    };

    tracing::debug!(path = %path.display(), "Loading config file");
    let file = read_file_config(&path)?;

    if file.server_url.is_some() {
        loader.set_server_url(file.server_url);
    }
    if file.database.is_some() {
        loader.set_database(file.database);
    }
    if file.username.is_some() {
        loader.set_user_name(file.username);
    }
    if file.session_id.is_some() {
        loader.set_session_id(file.session_id);
    }
    if file.skip_verify.is_some() {
        loader.set_skip_verify(file.skip_verify);
    }
    if let Some(secs) = file.timeout_seconds {
        loader.set_timeout(Some(Duration::from_secs(secs)));
    }
    if file.max_retries.is_some() {
        loader.set_max_retries(file.max_retries);
    }
    if file.results_limit.is_some() {
        loader.set_results_limit(file.results_limit);
    }
    if file.page_size.is_some() {
        loader.set_page_size(file.page_size);
    }
    if file.max_chart_groups.is_some() {
        loader.set_max_chart_groups(file.max_chart_groups);
    }
    if file.lookback_days.is_some() {
        loader.set_lookback_days(file.lookback_days);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"server_url": "https://a.example.com", "sever": 1}}"#).unwrap();

        let err = read_file_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigFileParse { .. }));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_file_config(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigFileRead { .. }));
    }
}
