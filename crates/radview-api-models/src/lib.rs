#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the Radview report API.
//!
//! The report service speaks a loosely typed JSON dialect (camelCase fields
//! mixed with snake_case ones, Mongo-style `_id` keys). These types pin the
//! shape down once so the core client and the CLI encode and decode the same
//! contract. Unknown report fields are kept in `extra` so a full replace never
//! drops data the client does not model.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Opaque server key of a report (`_id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(pub String);

impl Display for ReportId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ReportId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Opaque server key of a template (`_id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(pub String);

impl Display for TemplateId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Workflow status of a report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
    /// Awaiting first review.
    #[serde(rename = "Pending")]
    Pending,
    /// A doctor is reviewing the study.
    #[serde(rename = "In Review")]
    InReview,
    /// The doctor asked for additional information.
    #[serde(rename = "Need More Info")]
    NeedMoreInfo,
    /// Reporting finished.
    #[serde(rename = "Complete")]
    Complete,
    /// The uploaded study could not be processed.
    #[serde(rename = "Error in File")]
    ErrorInFile,
    /// A label this client does not know, kept verbatim so saves echo it back.
    #[serde(untagged)]
    Other(String),
}

impl ReportStatus {
    /// Every known status in the order the workflow presents them.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::InReview,
        Self::NeedMoreInfo,
        Self::Complete,
        Self::ErrorInFile,
    ];

    /// Wire label for the status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::InReview => "In Review",
            Self::NeedMoreInfo => "Need More Info",
            Self::Complete => "Complete",
            Self::ErrorInFile => "Error in File",
            Self::Other(label) => label,
        }
    }
}

impl Display for ReportStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error returned when a status label does not match any known status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl Display for UnknownStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "unknown report status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for ReportStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| {
                status.as_str().eq_ignore_ascii_case(wanted)
                    || status
                        .as_str()
                        .replace(' ', "-")
                        .eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

/// Patient age as sent by the server, which uses both numbers and strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatientAge {
    /// Numeric age in years, integral or not.
    Number(Number),
    /// Free-form age text (e.g. `"45Y"`).
    Text(String),
}

impl Display for PatientAge {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(years) => write!(f, "{years}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Human-facing report number, sent as a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayId {
    /// Numeric report number.
    Number(Number),
    /// Textual report number (e.g. `"RPT-12"`).
    Text(String),
}

impl Display for DisplayId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// One X-ray image attached to a report.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct XrayImage {
    /// Location of the image bytes.
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Side label (e.g. `PA`, `Left`).
    #[serde(default)]
    pub side: String,
    /// Fields the client does not model, echoed back on save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A patient report as stored by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Server key used in `/report/{id}` routes.
    #[serde(rename = "_id")]
    pub key: ReportId,
    /// Human-facing report number shown in listings.
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub display_id: Option<DisplayId>,
    /// Patient full name.
    #[serde(default)]
    pub patient_name: String,
    /// Patient age.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<PatientAge>,
    /// Patient gender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Location or imaging center.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Examined body part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_part: Option<String>,
    /// Workflow status.
    pub status: ReportStatus,
    /// Reporting doctor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    /// Upload timestamp as rendered by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_time: Option<String>,
    /// Free-text clinical history.
    #[serde(default)]
    pub history: String,
    /// Attached images.
    #[serde(rename = "xrayFiles", default)]
    pub images: Vec<XrayImage>,
    /// Ordered findings.
    #[serde(default)]
    pub findings: Vec<String>,
    /// Impression text.
    #[serde(default)]
    pub impression: String,
    /// Heading of the template the findings came from.
    #[serde(rename = "reportTemplate", default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Doctor feedback text.
    #[serde(rename = "doctor_feedback", default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    /// Fields the client does not model, echoed back on save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `GET /reports`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportListResponse {
    /// Full report collection.
    pub reports: Vec<Report>,
}

/// Body of `GET /report/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEnvelope {
    /// The requested report.
    pub report: Report,
}

/// A reusable report template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Server key used in `/template/{id}` routes.
    #[serde(rename = "_id")]
    pub id: TemplateId,
    /// Display heading, unique within the catalog by convention.
    #[serde(default)]
    pub heading: String,
    /// Ordered findings.
    #[serde(default)]
    pub findings: Vec<String>,
    /// Impression text.
    #[serde(default)]
    pub impression: String,
}

/// Body of `POST /template`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewTemplate {
    /// Display heading.
    pub heading: String,
    /// Ordered findings.
    pub findings: Vec<String>,
    /// Impression text.
    pub impression: String,
}

/// Body of `GET /templates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateListResponse {
    /// Template catalog.
    pub templates: Vec<Template>,
}

/// Body of `POST /login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    /// Account e-mail.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Body of `POST /signup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignupRequest {
    /// Requested user name.
    pub username: String,
    /// Requested password.
    pub password: String,
}

/// Successful auth response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
}

/// Error body returned by the report service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ErrorBody {
    /// Human-readable failure description.
    #[serde(default)]
    pub message: Option<String>,
}

/// Classifier confidence, sent as a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConfidenceScore {
    /// Plain JSON number.
    Number(f64),
    /// Number encoded as a string.
    Text(String),
}

impl ConfidenceScore {
    /// Numeric value, `None` when the text form is not a number.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

/// Body of `POST /predict`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PredictionResponse {
    /// Raw classifier label, first token is a class prefix.
    pub class_name: String,
    /// Confidence in `[0, 1]`.
    pub confidence_score: ConfidenceScore,
}
