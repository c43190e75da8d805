use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::form::FormState;
use crate::models::notice::{Notice, Notices};
use crate::models::suggestion::GenerateResponse;
use crate::services::api_client::WorkflowApi;
use crate::services::catalog_service::{load_catalog, Catalog};
use crate::services::rule_submitter::{submit_rule, SubmitMode, SubmitOutcome};
use crate::services::suggestion_service::{
    request_suggestions, validate_prompt, GenerationOutcome, SuggestionSession,
};

use super::AppState;

/// Which tab of the create page is in front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveView {
    #[default]
    Prompt,
    ManualReview,
}

/// State of the "create workflow" page: catalog, AI session and the form.
pub struct CreateScreen {
    api: Arc<dyn WorkflowApi>,
    catalog: Catalog,
    session: SuggestionSession,
    form: FormState,
    view: ActiveView,
    generating: bool,
    notices: Notices,
}

impl CreateScreen {
    pub fn new(state: &AppState) -> Self {
        Self::with_api(state.api())
    }

    pub fn with_api(api: Arc<dyn WorkflowApi>) -> Self {
        Self {
            api,
            catalog: Catalog::default(),
            session: SuggestionSession::default(),
            form: FormState::default(),
            view: ActiveView::default(),
            generating: false,
            notices: Notices::default(),
        }
    }

    /// Loads triggers and actions. Either list may fail on its own.
    pub async fn mount(&mut self) {
        let load = load_catalog(self.api.as_ref()).await;
        if load.trigger_error.is_some() {
            self.notices.push(Notice::error("Failed to load triggers."));
        }
        if load.action_error.is_some() {
            self.notices.push(Notice::error("Failed to load actions."));
        }
        self.catalog = load.catalog;
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn session(&self) -> &SuggestionSession {
        &self.session
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    pub fn active_view(&self) -> ActiveView {
        self.view
    }

    pub fn set_active_view(&mut self, view: ActiveView) {
        self.view = view;
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn can_generate(&self, prompt: &str) -> bool {
        !self.generating && !prompt.trim().is_empty()
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take()
    }

    /// Marks a generation as in flight. Rejected while another one runs.
    pub fn begin_generation(&mut self, prompt: &str) -> AppResult<()> {
        if self.generating {
            return Err(AppError::other("A generation is already in progress"));
        }
        validate_prompt(prompt)?;
        self.generating = true;
        Ok(())
    }

    /// Applies a finished generation. Failures leave catalog and form as
    /// they were.
    pub fn finish_generation(
        &mut self,
        result: AppResult<GenerateResponse>,
    ) -> AppResult<GenerationOutcome> {
        self.generating = false;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                self.notices.push(Notice::error(err.to_string()));
                return Err(err);
            }
        };

        let backend_message = response.message.clone();
        let outcome = self.session.apply_response(response, &mut self.form);

        match &outcome {
            GenerationOutcome::NoSuggestions => {
                self.notices.push(Notice::info(
                    backend_message
                        .unwrap_or_else(|| "The AI did not produce any workflow suggestions.".to_string()),
                ));
            }
            GenerationOutcome::AutoLoaded => {
                self.view = ActiveView::ManualReview;
                self.notices.push(Notice::success(
                    "Generated 1 workflow suggestion and loaded it for review.",
                ));
            }
            GenerationOutcome::AwaitingSelection(count) => {
                self.notices.push(Notice::info(format!(
                    "Generated {count} workflow suggestions. Select one to review."
                )));
            }
            GenerationOutcome::Created(rules) => {
                self.notices.push(Notice::success(format!(
                    "{} workflow(s) created.",
                    rules.len()
                )));
            }
            GenerationOutcome::ErrorsOnly => {}
        }

        for reported in self.session.global_errors() {
            self.notices
                .push(Notice::warning(format!("AI reported: {}", reported.summary())));
        }

        info!(target: "app::command", outcome = outcome_label(&outcome), "generation applied");
        Ok(outcome)
    }

    pub async fn generate(&mut self, prompt: &str) -> AppResult<GenerationOutcome> {
        if let Err(err) = self.begin_generation(prompt) {
            self.notices.push(Notice::error(err.to_string()));
            return Err(err);
        }
        let result = request_suggestions(self.api.as_ref(), prompt).await;
        self.finish_generation(result)
    }

    /// Loads suggestion `index` (zero based) into the form and switches to
    /// the review tab.
    pub fn select_suggestion(&mut self, index: usize) -> AppResult<()> {
        match self.session.select(index, &mut self.form) {
            Ok(preview) => {
                debug!(target: "app::command", index, label = preview.label(), "suggestion selected");
                self.view = ActiveView::ManualReview;
                Ok(())
            }
            Err(err) => {
                self.notices.push(Notice::error(err.to_string()));
                Err(err)
            }
        }
    }

    pub fn clear_form(&mut self) {
        self.session.clear(&mut self.form);
        self.view = ActiveView::Prompt;
    }

    /// Mapping notes of the loaded suggestion, shown as warnings.
    pub fn mapping_warnings(&self) -> Vec<Notice> {
        self.form
            .mapping_notes
            .iter()
            .map(|note| Notice::warning(note.clone()))
            .collect()
    }

    pub async fn save(&mut self) -> AppResult<SubmitOutcome> {
        match submit_rule(self.api.as_ref(), &mut self.form, &SubmitMode::Create).await {
            Ok(outcome) => {
                self.notices.push(Notice::success(outcome.message.clone()));
                self.session = SuggestionSession::default();
                self.view = ActiveView::Prompt;
                Ok(outcome)
            }
            Err(err) => {
                self.notices.push(Notice::error(err.to_string()));
                Err(err)
            }
        }
    }
}

fn outcome_label(outcome: &GenerationOutcome) -> &'static str {
    match outcome {
        GenerationOutcome::NoSuggestions => "no_suggestions",
        GenerationOutcome::AutoLoaded => "auto_loaded",
        GenerationOutcome::AwaitingSelection(_) => "awaiting_selection",
        GenerationOutcome::Created(_) => "created",
        GenerationOutcome::ErrorsOnly => "errors_only",
    }
}
