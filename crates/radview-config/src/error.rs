//! Error types for configuration operations.

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid value '{value}' for {field}: {reason}")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Offending value.
        value: String,
        /// Human-readable reason for the failure.
        reason: &'static str,
    },
    /// No credential path was given and the platform has no config directory.
    #[error("no configuration directory available; pass an explicit credential file")]
    ConfigDirUnavailable,
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
