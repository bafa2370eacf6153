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
#![allow(clippy::module_name_repetitions)]

//! Session, transport and view-model core for the Radview report client.
//!
//! Layout:
//! - `session.rs`: `SessionStore`, the single owner of the bearer token
//! - `credentials.rs`: persisted credential slot (file-backed or in-memory)
//! - `api.rs`: reqwest transport for every report-service endpoint
//! - `reports/`: list (filter, facets, pagination) and detail (draft, save) view models
//! - `templates.rs`: template catalog view model
//! - `prediction.rs`: per-image classifier calls with a bounded in-flight limit
//! - `load.rs`: load state and generation tickets for stale-response guards
//!
//! Views never reach for ambient state: each operation receives the
//! [`ApiClient`] and the [`Session`] it should act with.

pub mod api;
pub mod credentials;
pub mod error;
pub mod load;
pub mod prediction;
pub mod reports;
pub mod session;
pub mod templates;

pub use api::ApiClient;
pub use credentials::{CREDENTIAL_KEY, CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use error::{ApiError, ViewError};
pub use load::{LoadGeneration, LoadState, LoadTicket};
pub use prediction::{PredictionClient, PredictionResult};
pub use reports::detail::{DetailMode, ReportDetailView, ReportEdit, merge_edit};
pub use reports::list::{PAGE_SIZE, Pagination, ReportFilter, ReportListView};
pub use session::{BearerToken, Session, SessionStore};
pub use templates::{TemplateForm, TemplateManagerView, parse_findings};

use radview_api_models::ReportId;

/// Navigation targets a view can hand back to its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Report listing.
    Reports,
    /// One report, addressed by its server key.
    ReportDetail(ReportId),
    /// Template catalog.
    Templates,
}
