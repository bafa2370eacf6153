//! Default endpoints and limits for the client.
//!
//! # Design
//! - Every fallback lives here; validation and CLI help read the same constants.

/// Report service used when no API URL is configured.
pub const DEFAULT_API_URL: &str = "https://api.insightxai.in/";
/// Classifier service used when no prediction URL is configured.
pub const DEFAULT_PREDICT_URL: &str = "https://xray-backend-196i.onrender.com/";
/// Per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Upper bound accepted for the request timeout.
pub const MAX_TIMEOUT_SECS: u64 = 600;
/// Prediction requests allowed in flight at once.
pub const DEFAULT_PREDICTION_CONCURRENCY: usize = 4;
/// Upper bound accepted for prediction concurrency.
pub const MAX_PREDICTION_CONCURRENCY: usize = 32;
/// Directory under the platform config dir holding client state.
pub const APP_DIR_NAME: &str = "radview";
/// File holding the persisted credential.
pub const CREDENTIAL_FILE_NAME: &str = "credentials.json";
