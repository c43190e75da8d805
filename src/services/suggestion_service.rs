use tracing::{debug, info};

use crate::error::{AppError, AppResult, ValidationCode};
use crate::models::form::FormState;
use crate::models::rule::WorkflowRule;
use crate::models::suggestion::{AiReportedError, GenerateResponse, PreviewWorkflow};
use crate::services::api_client::WorkflowApi;
use crate::services::form_service::populate_form;

/// Trims the prompt and rejects it when nothing is left.
pub fn validate_prompt(prompt: &str) -> AppResult<&str> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::validation(
            ValidationCode::EmptyPrompt,
            "Describe the workflow before generating",
        ));
    }
    Ok(prompt)
}

/// Sends the prompt to the generation endpoint. A non-success status
/// without a backend message is reported as a generation failure with the
/// status code.
pub async fn request_suggestions(api: &dyn WorkflowApi, prompt: &str) -> AppResult<GenerateResponse> {
    let prompt = validate_prompt(prompt)?;

    debug!(target: "app::ai", prompt_len = prompt.len(), "requesting AI suggestions");

    match api.generate_from_ai(prompt).await {
        Ok(response) => {
            info!(
                target: "app::ai",
                previews = response.preview_workflows.len(),
                created = response.created_workflows.len(),
                reported_errors = response.ai_reported_errors.len(),
                "AI generation completed"
            );
            Ok(response)
        }
        Err(AppError::Api {
            status,
            from_backend: false,
            details,
            ..
        }) => Err(AppError::api_with_details(
            status,
            format!("AI generation failed (status {status})"),
            false,
            details,
        )),
        Err(err) => Err(err),
    }
}

/// How a generation response was applied to the create screen.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// Nothing came back; the form was not touched.
    NoSuggestions,
    /// Exactly one suggestion; it was loaded into the form.
    AutoLoaded,
    /// Several suggestions; the user has to pick one.
    AwaitingSelection(usize),
    /// An older backend created the rules directly.
    Created(Vec<WorkflowRule>),
    /// Only global errors came back.
    ErrorsOnly,
}

/// Suggestions returned by the last generation and which one is loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionSession {
    previews: Vec<PreviewWorkflow>,
    loaded_index: Option<usize>,
    global_errors: Vec<AiReportedError>,
    message: Option<String>,
}

impl SuggestionSession {
    pub fn previews(&self) -> &[PreviewWorkflow] {
        &self.previews
    }

    pub fn loaded_index(&self) -> Option<usize> {
        self.loaded_index
    }

    pub fn global_errors(&self) -> &[AiReportedError] {
        &self.global_errors
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Labels in display order, with `true` marking the loaded suggestion.
    pub fn labels(&self) -> Vec<(String, bool)> {
        self.previews
            .iter()
            .enumerate()
            .map(|(index, preview)| (preview.label().to_string(), self.loaded_index == Some(index)))
            .collect()
    }

    /// Replaces the session with a new response and applies the result-count
    /// policy to the form.
    pub fn apply_response(&mut self, response: GenerateResponse, form: &mut FormState) -> GenerationOutcome {
        let GenerateResponse {
            preview_workflows,
            created_workflows,
            ai_reported_errors,
            message,
        } = response;

        self.previews = preview_workflows;
        self.global_errors = ai_reported_errors;
        self.message = message;
        self.loaded_index = None;

        if !created_workflows.is_empty() {
            return GenerationOutcome::Created(created_workflows);
        }

        match self.previews.len() {
            0 if self.global_errors.is_empty() => GenerationOutcome::NoSuggestions,
            0 => GenerationOutcome::ErrorsOnly,
            1 => {
                populate_form(form, self.previews.first());
                self.loaded_index = Some(0);
                GenerationOutcome::AutoLoaded
            }
            count => GenerationOutcome::AwaitingSelection(count),
        }
    }

    /// Loads suggestion `index` into the form. Selecting the same index
    /// again discards edits made since.
    pub fn select(&mut self, index: usize, form: &mut FormState) -> AppResult<&PreviewWorkflow> {
        let Some(preview) = self.previews.get(index) else {
            return Err(AppError::validation(
                ValidationCode::InvalidSelection,
                format!(
                    "Suggestion {} does not exist ({} available)",
                    index + 1,
                    self.previews.len()
                ),
            ));
        };

        populate_form(form, Some(preview));
        self.loaded_index = Some(index);
        debug!(target: "app::ai", index, label = preview.label(), "suggestion loaded into form");
        Ok(preview)
    }

    pub fn clear(&mut self, form: &mut FormState) {
        *self = Self::default();
        populate_form(form, None);
    }
}
