//! Error types for transport and view-model operations.

use radview_api_models::ReportStatus;
use thiserror::Error;

/// Failure of a single call against the report or classifier service.
///
/// Transport failures, non-success statuses and malformed payloads are kept
/// apart so callers can log them precisely, even though every view treats
/// them the same way.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    Client {
        /// Underlying builder error.
        source: reqwest::Error,
    },
    /// The target URL could not be derived from the configured base.
    #[error("invalid endpoint for {operation}: {detail}")]
    Endpoint {
        /// Operation being attempted.
        operation: &'static str,
        /// Why the URL was rejected.
        detail: String,
    },
    /// The request never produced a response.
    #[error("request for {operation} failed")]
    Transport {
        /// Operation being attempted.
        operation: &'static str,
        /// Underlying transport error.
        source: reqwest::Error,
    },
    /// The service answered with a non-success status.
    #[error("{operation} returned status {status}: {}", .message.as_deref().unwrap_or("no detail"))]
    Status {
        /// Operation being attempted.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
        /// `message` from the error body, or the raw body text.
        message: Option<String>,
    },
    /// The response body did not match the expected shape.
    #[error("malformed response for {operation}: {detail}")]
    Decode {
        /// Operation being attempted.
        operation: &'static str,
        /// Decoder diagnostic.
        detail: String,
    },
}

impl ApiError {
    /// Server-provided message for non-success responses.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Message including the source chain, for logs and UI error banners.
    #[must_use]
    pub fn detailed(&self) -> String {
        match self {
            Self::Client { source } | Self::Transport { source, .. } => {
                format!("{self}: {source}")
            }
            _ => self.to_string(),
        }
    }
}

/// Failure of a view-model operation.
#[derive(Debug, Error)]
pub enum ViewError {
    /// The operation needs a bearer token and the session has none.
    #[error("not logged in")]
    Unauthenticated,
    /// The view has no data yet.
    #[error("report has not been loaded")]
    NotLoaded,
    /// The edit is only accepted in edit mode.
    #[error("{field} can only be changed while revising the report")]
    NotEditable {
        /// Field the caller attempted to change.
        field: &'static str,
    },
    /// Edit mode is reserved for completed reports.
    #[error("only completed reports can be revised (status is {status})")]
    EditModeUnavailable {
        /// Status of the fetched report.
        status: ReportStatus,
    },
    /// Image index outside the report's image collection.
    #[error("image {index} does not exist (report has {len} images)")]
    ImageOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of images on the report.
        len: usize,
    },
    /// No catalog template carries the requested heading.
    #[error("no template with heading '{0}'")]
    UnknownTemplate(String),
    /// Template index outside the loaded catalog.
    #[error("template {index} does not exist (catalog has {len} templates)")]
    TemplateOutOfRange {
        /// Requested index.
        index: usize,
        /// Catalog size.
        len: usize,
    },
    /// `create` was called without an open template form.
    #[error("no template form is open")]
    NoTemplateForm,
    /// `save_edit` was called without a template in edit mode.
    #[error("no template is being edited")]
    NotEditingTemplate,
    /// The remote call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}
