//! Validation helpers and parsing utilities for client settings.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::defaults::{
    APP_DIR_NAME, CREDENTIAL_FILE_NAME, MAX_PREDICTION_CONCURRENCY, MAX_TIMEOUT_SECS,
};
use crate::error::{ConfigError, ConfigResult};

/// Parse a service base URL.
///
/// Only `http` and `https` URLs with a host are accepted. The path is forced
/// to end with `/` so relative joins (`base.join("reports")`) keep any path
/// prefix the service is mounted under.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not a usable base URL.
pub fn parse_base_url(field: &'static str, value: &str) -> ConfigResult<Url> {
    let invalid = |reason| ConfigError::InvalidField {
        field,
        value: value.to_string(),
        reason,
    };

    let mut url = Url::parse(value.trim()).map_err(|_| invalid("not a valid URL"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("URL must include a host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("base URL must not carry a query or fragment"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Validate the request timeout.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for zero or values above the maximum.
pub fn parse_timeout(secs: u64) -> ConfigResult<Duration> {
    if secs == 0 || secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::InvalidField {
            field: "timeout",
            value: secs.to_string(),
            reason: "must be between 1 and 600 seconds",
        });
    }
    Ok(Duration::from_secs(secs))
}

/// Validate the prediction concurrency limit.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for zero or values above the maximum.
pub fn parse_concurrency(value: usize) -> ConfigResult<NonZeroUsize> {
    NonZeroUsize::new(value)
        .filter(|limit| limit.get() <= MAX_PREDICTION_CONCURRENCY)
        .ok_or_else(|| ConfigError::InvalidField {
            field: "prediction_concurrency",
            value: value.to_string(),
            reason: "must be between 1 and 32",
        })
}

/// Default location of the persisted credential file.
///
/// # Errors
///
/// Returns [`ConfigError::ConfigDirUnavailable`] when the platform exposes no
/// configuration directory.
pub fn default_credential_path() -> ConfigResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(CREDENTIAL_FILE_NAME))
        .ok_or(ConfigError::ConfigDirUnavailable)
}
