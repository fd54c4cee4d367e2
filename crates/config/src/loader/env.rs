//! Environment variable parsing for configuration.
//!
//! Responsibilities:
//! - Read and parse `FLEET_*` environment variables.
//! - Apply environment variable values to a ConfigLoader instance.
//!
//! Does NOT handle:
//! - Loading from the config file (see file.rs).
//! - Building the final Config (see builder.rs).
//!
//! Invariants:
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Returned values are trimmed (leading/trailing whitespace removed).
//! - Invalid numeric values return ConfigError::InvalidValue.

use std::str::FromStr;
use std::time::Duration;

use super::builder::ConfigLoader;
use super::error::ConfigError;

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn parse_env<T: FromStr>(key: &str, expected: &str) -> Result<Option<T>, ConfigError> {
    env_var_or_none(key)
        .map(|raw| raw.parse::<T>().map_err(|_| ConfigError::invalid(key, expected)))
        .transpose()
}

/// Apply environment variable configuration to the loader.
///
/// Environment variables take precedence over config file values.
pub fn apply_env(loader: &mut ConfigLoader) -> Result<(), ConfigError> {
    if let Some(url) = env_var_or_none("FLEET_SERVER_URL") {
        loader.set_server_url(Some(url));
    }
    if let Some(database) = env_var_or_none("FLEET_DATABASE") {
        loader.set_database(Some(database));
    }
    if let Some(user_name) = env_var_or_none("FLEET_USERNAME") {
        loader.set_user_name(Some(user_name));
    }
    if let Some(session_id) = env_var_or_none("FLEET_SESSION_ID") {
        loader.set_session_id(Some(session_id));
    }
    if let Some(skip) = parse_env::<bool>("FLEET_SKIP_VERIFY", "must be true or false")? {
        loader.set_skip_verify(Some(skip));
    }
    if let Some(secs) = parse_env::<u64>("FLEET_TIMEOUT", "must be a number of seconds")? {
        loader.set_timeout(Some(Duration::from_secs(secs)));
    }
    if let Some(retries) =
        parse_env::<usize>("FLEET_MAX_RETRIES", "must be a non-negative integer")?
    {
        loader.set_max_retries(Some(retries));
    }
    if let Some(limit) = parse_env::<u32>("FLEET_RESULTS_LIMIT", "must be a positive number")? {
        loader.set_results_limit(Some(limit));
    }
    if let Some(size) = parse_env::<usize>("FLEET_PAGE_SIZE", "must be a positive number")? {
        loader.set_page_size(Some(size));
    }

    if loader.config_path().is_none()
        && let Some(path) = env_var_or_none("FLEET_CONFIG_PATH")
    {
        loader.set_config_path(Some(std::path::PathBuf::from(path)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_var_or_none_filters_empty_and_whitespace_strings() {
        let key = "_FLEET_TEST_ENV_VAR";
        assert!(env_var_or_none(key).is_none(), "Unset env var should return None");

        temp_env::with_vars([(key, Some(""))], || {
            assert!(env_var_or_none(key).is_none());
        });

        temp_env::with_vars([(key, Some("   "))], || {
            assert!(env_var_or_none(key).is_none());
        });

        temp_env::with_vars([(key, Some(" value "))], || {
            assert_eq!(env_var_or_none(key), Some("value".to_string()));
        });
    }

    #[test]
    #[serial]
    fn test_invalid_numeric_env_is_rejected() {
        temp_env::with_vars([("FLEET_TIMEOUT", Some("soon"))], || {
            let mut loader = ConfigLoader::new();
            let err = apply_env(&mut loader).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { ref var, .. } if var == "FLEET_TIMEOUT")
            );
        });
    }

    #[test]
    #[serial]
    fn test_config_path_env_does_not_override_explicit_path() {
        temp_env::with_vars([("FLEET_CONFIG_PATH", Some("/from/env.json"))], || {
            let mut loader = ConfigLoader::new().with_config_path("/explicit.json".into());
            apply_env(&mut loader).unwrap();
            assert_eq!(
                loader.config_path(),
                Some(&std::path::PathBuf::from("/explicit.json"))
            );
        });
    }
}
