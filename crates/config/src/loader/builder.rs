//! Configuration loader builder implementation.
//!
//! Responsibilities:
//! - Provide a builder-pattern `ConfigLoader` for layered configuration merging.
//! - Support loading from the JSON config file, environment variables, and direct builder methods.
//! - Build the final `Config` and the offline `ReportDefaults` from loaded values.
//!
//! Does NOT handle:
//! - Direct environment variable parsing logic (delegated to env.rs).
//! - Config file parsing (delegated to file.rs).
//!
//! Invariants / Assumptions:
//! - Later layers win: call `from_file()` before `from_env()`, then `with_*` overrides.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.
//! - The `DOTENV_DISABLED` variable is checked before `dotenvy::dotenv()` is called.

use std::path::PathBuf;
use std::time::Duration;

use super::env::apply_env;
use super::error::ConfigError;
use super::file::apply_file;
use crate::constants::{
    DEFAULT_LOOKBACK_DAYS, DEFAULT_MAX_CHART_GROUPS, DEFAULT_MAX_RETRIES, DEFAULT_PAGE_SIZE,
    DEFAULT_RESULTS_LIMIT, DEFAULT_TIMEOUT_SECS, MAX_MAX_RETRIES, MAX_RESULTS_LIMIT,
    MAX_TIMEOUT_SECS,
};
use crate::types::{Config, ConnectionConfig, Credentials, ReportDefaults};

/// Configuration loader that builds config from a file, environment variables and overrides.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    server_url: Option<String>,
    database: Option<String>,
    user_name: Option<String>,
    session_id: Option<String>,
    skip_verify: Option<bool>,
    timeout: Option<Duration>,
    max_retries: Option<usize>,
    results_limit: Option<u32>,
    page_size: Option<usize>,
    max_chart_groups: Option<usize>,
    lookback_days: Option<u32>,
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if dotenv loading is disabled via environment variable.
    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var("DOTENV_DISABLED").ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Load environment variables from .env file if present.
    ///
    /// If `DOTENV_DISABLED` environment variable is set to "true" or "1",
    /// the .env file will not be loaded (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The `.env` file exists but has invalid syntax (`ConfigError::DotenvParse`)
    /// - The `.env` file exists but cannot be read due to I/O errors (`ConfigError::DotenvIo`)
    ///
    /// Missing `.env` files are silently ignored (returns `Ok(self)`).
    pub fn load_dotenv(self) -> Result<Self, ConfigError> {
        if Self::dotenv_disabled() {
            return Ok(self);
        }

        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if Self::is_not_found(&e) => Ok(self),
            Err(dotenvy::Error::LineParse(_, idx)) => {
                Err(ConfigError::DotenvParse { error_index: idx })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
                kind: io_err.kind(),
            }),
            Err(_) => Err(ConfigError::DotenvUnknown),
        }
    }

    fn is_not_found(err: &dotenvy::Error) -> bool {
        matches!(
            err,
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// Use an explicit config file path instead of `FLEET_CONFIG_PATH`.
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Read configuration from the JSON config file, if a path is known.
    ///
    /// The path is taken from `with_config_path` or, failing that, from
    /// `FLEET_CONFIG_PATH`.
    pub fn from_file(mut self) -> Result<Self, ConfigError> {
        if self.config_path.is_none() {
            self.config_path = super::env::env_var_or_none("FLEET_CONFIG_PATH").map(PathBuf::from);
        }
        apply_file(&mut self)?;
        Ok(self)
    }

    /// Read configuration from environment variables.
    ///
    /// Environment variables take precedence over config file settings.
    pub fn from_env(mut self) -> Result<Self, ConfigError> {
        apply_env(&mut self)?;
        Ok(self)
    }

    pub fn with_server_url(mut self, url: String) -> Self {
        self.server_url = Some(url);
        self
    }

    pub fn with_database(mut self, database: String) -> Self {
        self.database = Some(database);
        self
    }

    pub fn with_username(mut self, user_name: String) -> Self {
        self.user_name = Some(user_name);
        self
    }

    pub fn with_session_id(mut self, session_id: String) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Set whether to skip TLS verification.
    pub fn with_skip_verify(mut self, skip: bool) -> Self {
        self.skip_verify = Some(skip);
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set the per-category results limit.
    pub fn with_results_limit(mut self, limit: u32) -> Self {
        self.results_limit = Some(limit);
        self
    }

    /// Set the table page size.
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> Result<Config, ConfigError> {
        let server_url = self
            .server_url
            .as_deref()
            .map(validate_and_normalize_server_url)
            .transpose()?
            .ok_or(ConfigError::MissingServerUrl)?;

        let database = required(self.database.as_deref(), "database")?;
        let user_name = required(self.user_name.as_deref(), "username")?;
        let session_id = required(self.session_id.as_deref(), "session id")?;

        let connection = ConnectionConfig {
            server_url,
            skip_verify: self.skip_verify.unwrap_or(false),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
        };
        Self::validate_connection(&connection)?;

        let report = self.build_report_defaults()?;

        Ok(Config {
            connection,
            credentials: Credentials::new(database, user_name, session_id),
            report,
        })
    }

    /// Validates timeout and retry settings.
    fn validate_connection(connection: &ConnectionConfig) -> Result<(), ConfigError> {
        let timeout_secs = connection.timeout.as_secs();

        if timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout {
                message: "timeout must be greater than 0 seconds".to_string(),
            });
        }

        if timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::InvalidTimeout {
                message: format!(
                    "timeout exceeds maximum allowed value of {} seconds",
                    MAX_TIMEOUT_SECS
                ),
            });
        }

        if connection.max_retries > MAX_MAX_RETRIES {
            return Err(ConfigError::InvalidMaxRetries {
                message: format!(
                    "max retries exceeds maximum allowed value of {}",
                    MAX_MAX_RETRIES
                ),
            });
        }

        Ok(())
    }

    /// Build the report defaults from loaded values.
    ///
    /// Does not require credentials, so offline commands can use it.
    pub fn build_report_defaults(&self) -> Result<ReportDefaults, ConfigError> {
        let results_limit = match self.results_limit {
            None => DEFAULT_RESULTS_LIMIT,
            Some(0) => {
                return Err(ConfigError::invalid(
                    "results_limit",
                    "must be greater than 0",
                ));
            }
            Some(limit) if limit > MAX_RESULTS_LIMIT => {
                tracing::warn!(
                    requested = limit,
                    max = MAX_RESULTS_LIMIT,
                    "Results limit above server cap, clamping"
                );
                MAX_RESULTS_LIMIT
            }
            Some(limit) => limit,
        };

        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(ConfigError::invalid("page_size", "must be at least 1"));
        }

        let max_chart_groups = self.max_chart_groups.unwrap_or(DEFAULT_MAX_CHART_GROUPS);
        if max_chart_groups == 0 {
            return Err(ConfigError::invalid("max_chart_groups", "must be at least 1"));
        }

        Ok(ReportDefaults {
            results_limit,
            page_size,
            max_chart_groups,
            lookback_days: self.lookback_days.unwrap_or(DEFAULT_LOOKBACK_DAYS),
        })
    }

    /// Get the server URL if one was loaded.
    pub fn server_url(&self) -> Option<&str> {
        self.server_url.as_deref()
    }

    // Internal accessor methods for use by other loader modules

    pub(crate) fn config_path(&self) -> Option<&PathBuf> {
        self.config_path.as_ref()
    }

    pub(crate) fn set_config_path(&mut self, path: Option<PathBuf>) {
        self.config_path = path;
    }

    pub(crate) fn set_server_url(&mut self, url: Option<String>) {
        self.server_url = url;
    }

    pub(crate) fn set_database(&mut self, database: Option<String>) {
        self.database = database;
    }

    pub(crate) fn set_user_name(&mut self, user_name: Option<String>) {
        self.user_name = user_name;
    }

    pub(crate) fn set_session_id(&mut self, session_id: Option<String>) {
        self.session_id = session_id;
    }

    pub(crate) fn set_skip_verify(&mut self, skip: Option<bool>) {
        self.skip_verify = skip;
    }

    pub(crate) fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    pub(crate) fn set_max_retries(&mut self, retries: Option<usize>) {
        self.max_retries = retries;
    }

    pub(crate) fn set_results_limit(&mut self, limit: Option<u32>) {
        self.results_limit = limit;
    }

    pub(crate) fn set_page_size(&mut self, size: Option<usize>) {
        self.page_size = size;
    }

    pub(crate) fn set_max_chart_groups(&mut self, groups: Option<usize>) {
        self.max_chart_groups = groups;
    }

    pub(crate) fn set_lookback_days(&mut self, days: Option<u32>) {
        self.lookback_days = days;
    }
}

fn required(value: Option<&str>, field: &'static str) -> Result<String, ConfigError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ConfigError::MissingCredentials(field)),
    }
}

/// Validates and normalizes a server URL string.
///
/// Validation rules:
/// - Trim surrounding whitespace
/// - Treat blank/whitespace-only as missing (returns Err(ConfigError::MissingServerUrl))
/// - Parse as an absolute URL
/// - Require scheme is http or https
/// - Require host is present
/// - Normalize by stripping trailing slash
fn validate_and_normalize_server_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(ConfigError::MissingServerUrl);
    }

    let parsed = url::Url::parse(trimmed).map_err(|e| {
        ConfigError::invalid(
            "server_url",
            format!(
                "must be an absolute http(s) URL with a host (e.g. https://my.fleet.example.com): {e}"
            ),
        )
    })?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ConfigError::invalid(
            "server_url",
            format!("scheme must be http or https, got: {scheme}"),
        ));
    }

    if parsed.host_str().is_none() {
        return Err(ConfigError::invalid("server_url", "host is required"));
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ConfigLoader {
        ConfigLoader::new()
            .with_server_url("https://fleet.example.com/".to_string())
            .with_database("fleet_db".to_string())
            .with_username("reporter@example.com".to_string())
            .with_session_id("abc123".to_string())
    }

    #[test]
    fn test_build_normalizes_trailing_slash() {
        let config = complete().build().unwrap();
        assert_eq!(config.connection.server_url, "https://fleet.example.com");
        assert_eq!(config.credentials.database, "fleet_db");
        assert_eq!(config.credentials.session_id(), "abc123");
    }

    #[test]
    fn test_missing_server_url() {
        let err = ConfigLoader::new().build().unwrap_err();
        assert!(matches!(err, ConfigError::MissingServerUrl));
    }

    #[test]
    fn test_blank_server_url_is_missing() {
        let err = complete()
            .with_server_url("   ".to_string())
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingServerUrl));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let err = complete()
            .with_server_url("ftp://fleet.example.com".to_string())
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref var, .. } if var == "server_url"));
    }

    #[test]
    fn test_missing_session_id() {
        let err = ConfigLoader::new()
            .with_server_url("https://fleet.example.com".to_string())
            .with_database("db".to_string())
            .with_username("u".to_string())
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials("session id")));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = complete()
            .with_timeout(Duration::from_secs(0))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout { .. }));
    }

    #[test]
    fn test_too_many_retries_rejected() {
        let err = complete()
            .with_max_retries(MAX_MAX_RETRIES + 1)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMaxRetries { .. }));
    }

    #[test]
    fn test_results_limit_clamped_to_cap() {
        let defaults = ConfigLoader::new()
            .with_results_limit(MAX_RESULTS_LIMIT + 1)
            .build_report_defaults()
            .unwrap();
        assert_eq!(defaults.results_limit, MAX_RESULTS_LIMIT);
    }

    #[test]
    fn test_zero_results_limit_rejected() {
        let err = ConfigLoader::new()
            .with_results_limit(0)
            .build_report_defaults()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref var, .. } if var == "results_limit"));
    }

    #[test]
    fn test_report_defaults_without_credentials() {
        let defaults = ConfigLoader::new().build_report_defaults().unwrap();
        assert_eq!(defaults, ReportDefaults::default());
    }
}
