//! Report listing with status facets, search and local pagination.
//!
//! # Design
//! - The full collection is fetched once per load and paginated locally.
//! - Changing the filter or the search term keeps the current page.

use radview_api_models::{Report, ReportStatus};
use tracing::{info, warn};

use crate::Route;
use crate::api::ApiClient;
use crate::error::ApiError;
use crate::load::{LoadGeneration, LoadState, LoadTicket};
use crate::session::Session;

/// Rows per page.
pub const PAGE_SIZE: usize = 10;

/// Status filter plus patient-name search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    /// Only reports with this status; `None` keeps every status.
    pub status: Option<ReportStatus>,
    /// Case-insensitive substring of the patient name; empty matches all.
    pub search: String,
}

impl ReportFilter {
    /// `true` when `report` passes both the status filter and the search.
    #[must_use]
    pub fn matches(&self, report: &Report) -> bool {
        self.status.as_ref().is_none_or(|status| &report.status == status)
            && report
                .patient_name
                .to_lowercase()
                .contains(&self.search.to_lowercase())
    }
}

/// Page position over the filtered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based current page.
    pub current_page: usize,
    /// `ceil(filtered / PAGE_SIZE)`.
    pub total_pages: usize,
}

impl Pagination {
    /// Previous is enabled past the first page.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    /// Next is disabled on the last page and when there are no pages.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        !(self.current_page == self.total_pages || self.total_pages == 0)
    }
}

/// Distinct statuses in order of first appearance.
#[must_use]
pub fn status_facets(reports: &[Report]) -> Vec<ReportStatus> {
    let mut facets = Vec::new();
    for report in reports {
        if !facets.contains(&report.status) {
            facets.push(report.status.clone());
        }
    }
    facets
}

/// State behind the report listing.
#[derive(Debug, Clone)]
pub struct ReportListView {
    reports: Vec<Report>,
    facets: Vec<ReportStatus>,
    filter: ReportFilter,
    current_page: usize,
    state: LoadState,
    generation: LoadGeneration,
}

impl Default for ReportListView {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportListView {
    /// Empty listing on page 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reports: Vec::new(),
            facets: Vec::new(),
            filter: ReportFilter::default(),
            current_page: 1,
            state: LoadState::Idle,
            generation: LoadGeneration::default(),
        }
    }

    /// Fetch the collection. Without a token the view stays idle.
    pub async fn load(&mut self, api: &ApiClient, session: &Session) {
        let Some(token) = session.token() else {
            return;
        };
        let ticket = self.begin_load();
        let outcome = api.list_reports(token).await;
        self.finish_load(ticket, outcome);
    }

    /// Mark a fetch as started and return its ticket.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.state = LoadState::Loading;
        self.generation.begin()
    }

    /// Apply a fetch result; results from superseded tickets are dropped.
    pub fn finish_load(&mut self, ticket: LoadTicket, outcome: Result<Vec<Report>, ApiError>) {
        if !self.generation.is_current(ticket) {
            return;
        }
        match outcome {
            Ok(reports) => {
                info!(count = reports.len(), "reports loaded");
                self.facets = status_facets(&reports);
                self.reports = reports;
                self.state = LoadState::Ready;
            }
            Err(err) => {
                warn!(error = %err.detailed(), "failed to load reports");
                self.state = LoadState::Failed(err.to_string());
            }
        }
    }

    /// Current load state.
    #[must_use]
    pub const fn state(&self) -> &LoadState {
        &self.state
    }

    /// Every fetched report, unfiltered.
    #[must_use]
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    /// Status facets of the latest fetch.
    #[must_use]
    pub fn facets(&self) -> &[ReportStatus] {
        &self.facets
    }

    /// Active filter.
    #[must_use]
    pub const fn filter(&self) -> &ReportFilter {
        &self.filter
    }

    /// Restrict the listing to one status, or clear the restriction.
    pub fn set_status_filter(&mut self, status: Option<ReportStatus>) {
        self.filter.status = status;
    }

    /// Replace the patient-name search term.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
    }

    /// Jump to `page`; page numbers start at 1.
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    /// Advance one page when Next is enabled. Returns whether the page moved.
    pub fn next_page(&mut self) -> bool {
        if self.pagination().has_next() && self.current_page < usize::MAX {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page when Previous is enabled. Returns whether the page moved.
    pub fn previous_page(&mut self) -> bool {
        if self.pagination().has_previous() {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    /// Reports passing the filter, in server order.
    pub fn filtered(&self) -> impl Iterator<Item = &Report> {
        self.reports
            .iter()
            .filter(|report| self.filter.matches(report))
    }

    /// Rows on the current page.
    #[must_use]
    pub fn page(&self) -> Vec<&Report> {
        self.filtered()
            .skip(self.current_page.saturating_sub(1).saturating_mul(PAGE_SIZE))
            .take(PAGE_SIZE)
            .collect()
    }

    /// Page position over the filtered rows.
    #[must_use]
    pub fn pagination(&self) -> Pagination {
        Pagination {
            current_page: self.current_page,
            total_pages: self.filtered().count().div_ceil(PAGE_SIZE),
        }
    }

    /// Route to the detail view for `row` (0-based) on the current page.
    #[must_use]
    pub fn select(&self, row: usize) -> Option<Route> {
        self.page()
            .get(row)
            .map(|report| Route::ReportDetail(report.key.clone()))
    }
}
