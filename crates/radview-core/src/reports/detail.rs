//! Single-report editor: draft, revision mode, template selection and save.
//!
//! # Design
//! - One mutable draft per view. Every edit goes through [`merge_edit`], a
//!   pure function returning the next draft.
//! - Revision mode is local only and is offered for completed reports.
//! - Selecting a template changes what is displayed and what is saved, never
//!   the draft itself; leaving revision mode discards the selection.
//! - A successful save re-fetches the report and the catalog and replaces
//!   the in-memory state.

use radview_api_models::{Report, ReportId, ReportStatus, Template};
use tracing::{error, info, warn};

use crate::api::ApiClient;
use crate::error::{ApiError, ViewError};
use crate::load::{LoadGeneration, LoadState, LoadTicket};
use crate::prediction::{PredictionClient, PredictionResult};
use crate::session::Session;

/// One local change to the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEdit {
    /// Replace the clinical history.
    History(String),
    /// Replace the side label of the image at `index`.
    ImageSide {
        /// Position in the report's image collection.
        index: usize,
        /// New side label.
        side: String,
    },
    /// Replace the workflow status.
    Status(ReportStatus),
    /// Replace the doctor feedback text.
    Feedback(String),
}

impl ReportEdit {
    const fn field(&self) -> &'static str {
        match self {
            Self::History(_) => "history",
            Self::ImageSide { .. } => "image side",
            Self::Status(_) => "status",
            Self::Feedback(_) => "feedback",
        }
    }

    const fn requires_revision(&self) -> bool {
        matches!(self, Self::Status(_) | Self::Feedback(_))
    }
}

/// Apply one edit to `report`, returning the updated copy.
///
/// Only the targeted field changes; image edits touch only the addressed element.
///
/// # Errors
///
/// Returns [`ViewError::ImageOutOfRange`] when an image index does not exist.
pub fn merge_edit(report: &Report, edit: &ReportEdit) -> Result<Report, ViewError> {
    let mut next = report.clone();
    match edit {
        ReportEdit::History(history) => next.history.clone_from(history),
        ReportEdit::ImageSide { index, side } => {
            let len = next.images.len();
            let image = next
                .images
                .get_mut(*index)
                .ok_or(ViewError::ImageOutOfRange { index: *index, len })?;
            image.side.clone_from(side);
        }
        ReportEdit::Status(status) => next.status.clone_from(status),
        ReportEdit::Feedback(feedback) => next.feedback = Some(feedback.clone()),
    }
    Ok(next)
}

/// Whether the report is being revised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetailMode {
    /// Status, feedback and template are displayed only.
    #[default]
    ReadOnly,
    /// Status, feedback and template selection are editable.
    Editing,
}

/// State behind the report detail screen.
#[derive(Debug, Clone)]
pub struct ReportDetailView {
    id: ReportId,
    fetched: Option<Report>,
    draft: Option<Report>,
    templates: Vec<Template>,
    selected_template: Option<Template>,
    mode: DetailMode,
    predictions: Vec<Option<PredictionResult>>,
    state: LoadState,
    generation: LoadGeneration,
}

impl ReportDetailView {
    /// Empty view for the report addressed by `id`.
    #[must_use]
    pub fn new(id: ReportId) -> Self {
        Self {
            id,
            fetched: None,
            draft: None,
            templates: Vec::new(),
            selected_template: None,
            mode: DetailMode::ReadOnly,
            predictions: Vec::new(),
            state: LoadState::Idle,
            generation: LoadGeneration::default(),
        }
    }

    /// Fetch the report and the template catalog concurrently.
    ///
    /// Without a token the view stays idle.
    pub async fn load(&mut self, api: &ApiClient, session: &Session) {
        let Some(token) = session.token() else {
            return;
        };
        let ticket = self.begin_load();
        let (report, templates) = tokio::join!(
            api.fetch_report(token, &self.id),
            api.list_templates(token)
        );
        self.finish_load(ticket, report, templates);
    }

    /// Mark a fetch as started and return its ticket.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.state = LoadState::Loading;
        self.generation.begin()
    }

    /// Apply fetch results; results from superseded tickets are dropped.
    ///
    /// A catalog failure is tolerated with an empty catalog; a report failure
    /// blocks the view.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        report: Result<Report, ApiError>,
        templates: Result<Vec<Template>, ApiError>,
    ) {
        if !self.generation.is_current(ticket) {
            return;
        }
        self.templates = templates.unwrap_or_else(|err| {
            warn!(error = %err.detailed(), "failed to load templates");
            Vec::new()
        });
        match report {
            Ok(report) => {
                info!(report = %self.id, status = %report.status, "report loaded");
                self.predictions = vec![None; report.images.len()];
                self.fetched = Some(report.clone());
                self.draft = Some(report);
                self.mode = DetailMode::ReadOnly;
                self.selected_template = None;
                self.state = LoadState::Ready;
            }
            Err(err) => {
                warn!(report = %self.id, error = %err.detailed(), "failed to load report");
                self.state = LoadState::Failed(err.to_string());
            }
        }
    }

    /// Server key of the report.
    #[must_use]
    pub const fn id(&self) -> &ReportId {
        &self.id
    }

    /// Current load state.
    #[must_use]
    pub const fn state(&self) -> &LoadState {
        &self.state
    }

    /// Working copy including local edits.
    #[must_use]
    pub const fn draft(&self) -> Option<&Report> {
        self.draft.as_ref()
    }

    /// Report as last fetched.
    #[must_use]
    pub const fn fetched(&self) -> Option<&Report> {
        self.fetched.as_ref()
    }

    /// `true` when the draft differs from the fetched report.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.draft != self.fetched
    }

    /// Loaded template catalog.
    #[must_use]
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Whether the report is being revised.
    #[must_use]
    pub const fn mode(&self) -> DetailMode {
        self.mode
    }

    /// `true` when the doctor asked for more information.
    #[must_use]
    pub fn awaiting_information(&self) -> bool {
        self.draft
            .as_ref()
            .is_some_and(|report| report.status == ReportStatus::Pending)
    }

    /// Apply one edit to the draft.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::NotLoaded`] before the report arrives,
    /// [`ViewError::NotEditable`] for status or feedback outside revision
    /// mode, and [`ViewError::ImageOutOfRange`] for a bad image index.
    pub fn apply_edit(&mut self, edit: &ReportEdit) -> Result<(), ViewError> {
        let draft = self.draft.as_ref().ok_or(ViewError::NotLoaded)?;
        if edit.requires_revision() && self.mode != DetailMode::Editing {
            return Err(ViewError::NotEditable {
                field: edit.field(),
            });
        }
        self.draft = Some(merge_edit(draft, edit)?);
        Ok(())
    }

    /// Enter revision mode. Only completed reports can be revised.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::NotLoaded`] before the report arrives and
    /// [`ViewError::EditModeUnavailable`] for any other status.
    pub fn enter_edit_mode(&mut self) -> Result<(), ViewError> {
        let draft = self.draft.as_ref().ok_or(ViewError::NotLoaded)?;
        if self.mode == DetailMode::Editing {
            return Ok(());
        }
        if draft.status != ReportStatus::Complete {
            return Err(ViewError::EditModeUnavailable {
                status: draft.status.clone(),
            });
        }
        self.mode = DetailMode::Editing;
        Ok(())
    }

    /// Leave revision mode, dropping the template selection.
    pub fn exit_edit_mode(&mut self) {
        self.mode = DetailMode::ReadOnly;
        self.selected_template = None;
    }

    /// Pick the catalog template whose heading equals `heading`.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::NotEditable`] outside revision mode and
    /// [`ViewError::UnknownTemplate`] when no template carries the heading.
    pub fn select_template(&mut self, heading: &str) -> Result<&Template, ViewError> {
        if self.mode != DetailMode::Editing {
            return Err(ViewError::NotEditable { field: "template" });
        }
        let template = self
            .templates
            .iter()
            .find(|template| template.heading == heading)
            .ok_or_else(|| ViewError::UnknownTemplate(heading.to_string()))?;
        Ok(self.selected_template.insert(template.clone()))
    }

    /// Drop the selected template, showing the report's own content again.
    pub fn clear_template_selection(&mut self) {
        self.selected_template = None;
    }

    /// Template picked in revision mode, if any.
    #[must_use]
    pub const fn selected_template(&self) -> Option<&Template> {
        self.selected_template.as_ref()
    }

    fn active_template(&self) -> Option<&Template> {
        match self.mode {
            DetailMode::Editing => self.selected_template.as_ref(),
            DetailMode::ReadOnly => None,
        }
    }

    /// Findings to display: the selected template's while revising, else the draft's.
    #[must_use]
    pub fn effective_findings(&self) -> &[String] {
        match (self.active_template(), self.draft.as_ref()) {
            (Some(template), _) => &template.findings,
            (None, Some(report)) => &report.findings,
            (None, None) => &[],
        }
    }

    /// Impression to display, chosen the same way as the findings.
    #[must_use]
    pub fn effective_impression(&self) -> &str {
        match (self.active_template(), self.draft.as_ref()) {
            (Some(template), _) => &template.impression,
            (None, Some(report)) => &report.impression,
            (None, None) => "",
        }
    }

    /// Template heading to display.
    #[must_use]
    pub fn effective_template(&self) -> Option<&str> {
        self.active_template()
            .map(|template| template.heading.as_str())
            .or_else(|| self.draft.as_ref().and_then(|report| report.template.as_deref()))
    }

    /// Report body sent on save: the draft with the selected template applied.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::NotLoaded`] before the report arrives.
    pub fn save_payload(&self) -> Result<Report, ViewError> {
        let mut payload = self.draft.clone().ok_or(ViewError::NotLoaded)?;
        if let Some(template) = self.active_template() {
            payload.template = Some(template.heading.clone());
            payload.findings.clone_from(&template.findings);
            payload.impression.clone_from(&template.impression);
        }
        Ok(payload)
    }

    /// Replace the report on the server, then re-fetch it.
    ///
    /// On failure the draft and mode are kept so the save can be retried.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Unauthenticated`] without a token,
    /// [`ViewError::NotLoaded`] before the report arrives, and
    /// [`ViewError::Api`] when the update is rejected.
    pub async fn save(&mut self, api: &ApiClient, session: &Session) -> Result<(), ViewError> {
        let token = session.token().ok_or(ViewError::Unauthenticated)?;
        let payload = self.save_payload()?;
        if let Err(err) = api.update_report(token, &payload).await {
            error!(report = %self.id, error = %err.detailed(), "failed to update report");
            return Err(err.into());
        }
        info!(report = %self.id, status = %payload.status, "report updated");
        self.load(api, session).await;
        Ok(())
    }

    /// Classify every image of the draft.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Unauthenticated`] without a token and
    /// [`ViewError::NotLoaded`] before the report arrives.
    pub async fn run_predictions(
        &mut self,
        client: &PredictionClient,
        session: &Session,
    ) -> Result<(), ViewError> {
        let token = session.token().ok_or(ViewError::Unauthenticated)?;
        let draft = self.draft.as_ref().ok_or(ViewError::NotLoaded)?;
        let predictions = client.predict_images(token, &draft.images).await;
        self.predictions = predictions;
        Ok(())
    }

    /// Prediction slot per image, in image order.
    #[must_use]
    pub fn predictions(&self) -> &[Option<PredictionResult>] {
        &self.predictions
    }
}
