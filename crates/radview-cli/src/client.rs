//! Application context, error types, and error mapping for the CLI.

use std::fmt::{self, Display, Formatter};

use anyhow::anyhow;
use radview_config::{ClientConfig, ConfigError};
use radview_core::{
    ApiClient, ApiError, CredentialStore, FileCredentialStore, LoadState, PredictionClient,
    SessionStore, ViewError,
};

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::validation(err.to_string())
    }
}

impl From<ViewError> for CliError {
    fn from(err: ViewError) -> Self {
        match err {
            ViewError::Unauthenticated => {
                Self::validation("not logged in (run `radview login` first)")
            }
            ViewError::NotLoaded => Self::failure(anyhow!("report is not available")),
            ViewError::Api(api) => classify_api_error(api),
            other => Self::validation(other.to_string()),
        }
    }
}

/// Classify a transport error into a CLI error.
///
/// Client-side rejections (400, 409, 422) are reported as validation errors,
/// everything else as an operational failure.
pub(crate) fn classify_api_error(err: ApiError) -> CliError {
    match &err {
        ApiError::Status {
            status: 400 | 409 | 422,
            message,
            ..
        } => CliError::validation(message.clone().unwrap_or_else(|| err.to_string())),
        _ => CliError::failure(err),
    }
}

/// Turn a view's load state into a result once its fetch has finished.
pub(crate) fn ensure_loaded(state: &LoadState) -> CliResult<()> {
    match state {
        LoadState::Ready => Ok(()),
        LoadState::Failed(message) => Err(CliError::failure(anyhow!(message.clone()))),
        LoadState::Idle => Err(CliError::from(ViewError::Unauthenticated)),
        LoadState::Loading => Err(CliError::failure(anyhow!("request did not complete"))),
    }
}

/// Application context passed to command handlers.
pub(crate) struct AppContext<S = FileCredentialStore> {
    pub(crate) api: ApiClient,
    pub(crate) predictions: PredictionClient,
    pub(crate) session: SessionStore<S>,
}

impl AppContext {
    /// Build the transport and restore the persisted session.
    pub(crate) fn from_config(config: &ClientConfig, trace_id: &str) -> CliResult<Self> {
        let api = ApiClient::new(config, Some(trace_id)).map_err(CliError::failure)?;
        let credentials = FileCredentialStore::new(&config.credential_path);
        Ok(Self::with_store(api, config, credentials))
    }
}

impl<S: CredentialStore> AppContext<S> {
    pub(crate) fn with_store(api: ApiClient, config: &ClientConfig, credentials: S) -> Self {
        Self {
            predictions: PredictionClient::new(api.clone(), config.prediction_concurrency),
            session: SessionStore::restore(credentials),
            api,
        }
    }
}
