//! Raw settings and the validated client configuration.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::defaults::{
    DEFAULT_API_URL, DEFAULT_PREDICT_URL, DEFAULT_PREDICTION_CONCURRENCY, DEFAULT_TIMEOUT_SECS,
};
use crate::error::ConfigResult;
use crate::validate::{default_credential_path, parse_base_url, parse_concurrency, parse_timeout};

/// Unvalidated settings as gathered from flags and environment variables.
///
/// Every field is optional; missing values fall back to [`crate::defaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientSettings {
    /// Report service base URL.
    pub api_url: Option<String>,
    /// Classifier service base URL.
    pub predict_url: Option<String>,
    /// Location of the persisted credential file.
    pub credential_path: Option<PathBuf>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Maximum prediction requests in flight.
    pub prediction_concurrency: Option<usize>,
}

impl ClientSettings {
    /// Validate the settings and fill in defaults.
    ///
    /// # Errors
    ///
    /// Returns the first [`crate::ConfigError`] encountered.
    pub fn validate(self) -> ConfigResult<ClientConfig> {
        let api_url = parse_base_url("api_url", self.api_url.as_deref().unwrap_or(DEFAULT_API_URL))?;
        let predict_url = parse_base_url(
            "predict_url",
            self.predict_url.as_deref().unwrap_or(DEFAULT_PREDICT_URL),
        )?;
        let credential_path = match self.credential_path {
            Some(path) => path,
            None => default_credential_path()?,
        };
        let http_timeout = parse_timeout(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))?;
        let prediction_concurrency = parse_concurrency(
            self.prediction_concurrency
                .unwrap_or(DEFAULT_PREDICTION_CONCURRENCY),
        )?;

        tracing::debug!(
            api_url = %api_url,
            predict_url = %predict_url,
            credential_path = %credential_path.display(),
            timeout_secs = http_timeout.as_secs(),
            prediction_concurrency = prediction_concurrency.get(),
            "client configuration resolved"
        );

        Ok(ClientConfig {
            api_url,
            predict_url,
            credential_path,
            http_timeout,
            prediction_concurrency,
        })
    }
}

/// Validated client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Report service base URL, always ending in `/`.
    pub api_url: Url,
    /// Classifier service base URL, always ending in `/`.
    pub predict_url: Url,
    /// Location of the persisted credential file.
    pub credential_path: PathBuf,
    /// Per-request timeout.
    pub http_timeout: Duration,
    /// Maximum prediction requests in flight.
    pub prediction_concurrency: NonZeroUsize,
}
