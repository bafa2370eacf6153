//! Template catalog: listing, creation and single-slot editing.

use radview_api_models::{NewTemplate, Template};
use tracing::{error, info, warn};

use crate::api::ApiClient;
use crate::error::{ApiError, ViewError};
use crate::load::{LoadGeneration, LoadState, LoadTicket};
use crate::session::Session;

/// Split comma-separated findings, trimming each entry. Empty entries are kept.
#[must_use]
pub fn parse_findings(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .map(str::to_string)
        .collect()
}

/// Inputs of the "add template" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateForm {
    /// Display heading.
    pub heading: String,
    /// Findings as typed, comma-separated.
    pub findings_input: String,
    /// Impression text.
    pub impression: String,
}

impl TemplateForm {
    /// Request body for `POST /template`. No field is required.
    #[must_use]
    pub fn to_request(&self) -> NewTemplate {
        NewTemplate {
            heading: self.heading.clone(),
            findings: parse_findings(&self.findings_input),
            impression: self.impression.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct EditSlot {
    index: usize,
    draft: Template,
}

/// State behind the template management screen.
#[derive(Debug, Clone, Default)]
pub struct TemplateManagerView {
    templates: Vec<Template>,
    form: Option<TemplateForm>,
    editing: Option<EditSlot>,
    state: LoadState,
    generation: LoadGeneration,
}

impl TemplateManagerView {
    /// Empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the catalog. Without a token the view stays idle.
    pub async fn load(&mut self, api: &ApiClient, session: &Session) {
        let Some(token) = session.token() else {
            return;
        };
        let ticket = self.begin_load();
        let outcome = api.list_templates(token).await;
        self.finish_load(ticket, outcome);
    }

    /// Mark a fetch as started and return its ticket.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.state = LoadState::Loading;
        self.generation.begin()
    }

    /// Apply a fetch result; results from superseded tickets are dropped.
    pub fn finish_load(&mut self, ticket: LoadTicket, outcome: Result<Vec<Template>, ApiError>) {
        if !self.generation.is_current(ticket) {
            return;
        }
        match outcome {
            Ok(templates) => {
                info!(count = templates.len(), "templates loaded");
                self.templates = templates;
                self.state = LoadState::Ready;
            }
            Err(err) => {
                warn!(error = %err.detailed(), "failed to load templates");
                self.state = LoadState::Failed(err.to_string());
            }
        }
    }

    /// Current load state.
    #[must_use]
    pub const fn state(&self) -> &LoadState {
        &self.state
    }

    /// Loaded catalog, in server order.
    #[must_use]
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Open the "add template" form, keeping any input already typed.
    pub fn open_create_form(&mut self) -> &mut TemplateForm {
        self.form.get_or_insert_with(TemplateForm::default)
    }

    /// Open form, if any.
    #[must_use]
    pub const fn form(&self) -> Option<&TemplateForm> {
        self.form.as_ref()
    }

    /// Mutable access to the open form.
    pub const fn form_mut(&mut self) -> Option<&mut TemplateForm> {
        self.form.as_mut()
    }

    /// Close the form, discarding its input.
    pub fn cancel_create(&mut self) {
        self.form = None;
    }

    /// Submit the open form, then reset it and re-fetch the catalog.
    ///
    /// On failure the form keeps its input.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Unauthenticated`] without a token,
    /// [`ViewError::NoTemplateForm`] when no form is open, and
    /// [`ViewError::Api`] when the server rejects the template.
    pub async fn create(&mut self, api: &ApiClient, session: &Session) -> Result<(), ViewError> {
        let token = session.token().ok_or(ViewError::Unauthenticated)?;
        let request = self
            .form
            .as_ref()
            .ok_or(ViewError::NoTemplateForm)?
            .to_request();
        if let Err(err) = api.create_template(token, &request).await {
            error!(heading = %request.heading, error = %err.detailed(), "failed to create template");
            return Err(err.into());
        }
        info!(heading = %request.heading, "template created");
        self.form = None;
        self.load(api, session).await;
        Ok(())
    }

    /// Stage a copy of the template at `index` for editing.
    ///
    /// Any template already being edited is dropped along with its changes.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::TemplateOutOfRange`] for an unknown index.
    pub fn begin_edit(&mut self, index: usize) -> Result<&mut Template, ViewError> {
        let template = self
            .templates
            .get(index)
            .ok_or(ViewError::TemplateOutOfRange {
                index,
                len: self.templates.len(),
            })?;
        let slot = self.editing.insert(EditSlot {
            index,
            draft: template.clone(),
        });
        Ok(&mut slot.draft)
    }

    /// Index of the template being edited.
    #[must_use]
    pub fn editing_index(&self) -> Option<usize> {
        self.editing.as_ref().map(|slot| slot.index)
    }

    /// Staged copy of the template being edited.
    #[must_use]
    pub fn edit_draft(&self) -> Option<&Template> {
        self.editing.as_ref().map(|slot| &slot.draft)
    }

    /// Mutable access to the staged copy.
    pub fn edit_draft_mut(&mut self) -> Option<&mut Template> {
        self.editing.as_mut().map(|slot| &mut slot.draft)
    }

    /// Drop the staged copy.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// PUT the staged copy, then clear edit state and re-fetch the catalog.
    ///
    /// On failure the staged copy is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Unauthenticated`] without a token,
    /// [`ViewError::NotEditingTemplate`] when nothing is staged, and
    /// [`ViewError::Api`] when the server rejects the update.
    pub async fn save_edit(&mut self, api: &ApiClient, session: &Session) -> Result<(), ViewError> {
        let token = session.token().ok_or(ViewError::Unauthenticated)?;
        let slot = self.editing.as_ref().ok_or(ViewError::NotEditingTemplate)?;
        if let Err(err) = api.update_template(token, &slot.draft).await {
            error!(template = %slot.draft.id, error = %err.detailed(), "failed to update template");
            return Err(err.into());
        }
        info!(template = %slot.draft.id, "template updated");
        self.editing = None;
        self.load(api, session).await;
        Ok(())
    }
}
