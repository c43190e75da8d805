use serde_json::json;
use tracing::info;

use crate::error::{AppError, AppResult, ValidationCode};
use crate::models::catalog::CatalogId;
use crate::models::form::FormState;
use crate::models::rule::{RulePayload, RuleType, WorkflowRule};
use crate::services::api_client::WorkflowApi;

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitMode {
    Create,
    Update(CatalogId),
}

/// What the screen should do after a successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterSave {
    ResetForm,
    NavigateToRuleList,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub rule: WorkflowRule,
    pub after_save: AfterSave,
    pub message: String,
}

/// Validates the form and builds the request body. Nothing is sent when
/// this fails.
pub fn build_payload(form: &FormState) -> AppResult<RulePayload> {
    let missing: Vec<&str> = [
        ("workflow name", form.workflow_name.as_str()),
        ("trigger", form.selected_trigger.as_str()),
        ("action", form.selected_action.as_str()),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
    .collect();

    if !missing.is_empty() {
        return Err(AppError::validation_with_details(
            ValidationCode::MissingRequiredField,
            format!("Missing required field: {}", missing.join(", ")),
            json!({ "fields": missing }),
        ));
    }

    let trigger_id = parse_identifier("trigger", &form.selected_trigger)?;
    let action_id = parse_identifier("action", &form.selected_action)?;

    let (delay_time, delay_unit) = match form.rule_type {
        RuleType::Scheduled => (Some(parse_delay(&form.delay_time)?), Some(form.delay_unit)),
        RuleType::Immediate => (None, None),
    };

    Ok(RulePayload {
        name: form.workflow_name.trim().to_string(),
        description: form.workflow_description.trim().to_string(),
        trigger_id,
        action_id,
        rule_type: form.rule_type,
        is_active: form.is_active,
        delay_time,
        delay_unit,
    })
}

fn parse_identifier(field: &str, value: &str) -> AppResult<i64> {
    value.trim().parse().map_err(|_| {
        AppError::validation_with_details(
            ValidationCode::InvalidIdentifier,
            format!("Selected {field} '{value}' is not a valid catalog id"),
            json!({ "field": field, "value": value }),
        )
    })
}

fn parse_delay(value: &str) -> AppResult<i64> {
    match value.trim().parse::<i64>() {
        Ok(delay) if delay > 0 => Ok(delay),
        _ => Err(AppError::validation_with_details(
            ValidationCode::InvalidDelay,
            "Delay must be a positive whole number for scheduled workflows",
            json!({ "value": value }),
        )),
    }
}

/// Validates, sends a create or update, and on success for the create flow
/// resets the form. The form is left untouched on any failure.
pub async fn submit_rule(
    api: &dyn WorkflowApi,
    form: &mut FormState,
    mode: &SubmitMode,
) -> AppResult<SubmitOutcome> {
    let payload = build_payload(form)?;

    match mode {
        SubmitMode::Create => {
            let rule = api.create_rule(&payload).await?;
            info!(target: "app::rules", rule_id = %rule.id, "rule created");
            *form = FormState::default();
            Ok(SubmitOutcome {
                message: format!("Workflow \"{}\" saved successfully!", rule.name),
                rule,
                after_save: AfterSave::ResetForm,
            })
        }
        SubmitMode::Update(id) => {
            let rule = api.update_rule(id, &payload).await?;
            info!(target: "app::rules", rule_id = %rule.id, "rule updated");
            Ok(SubmitOutcome {
                message: format!("Workflow \"{}\" updated successfully!", rule.name),
                rule,
                after_save: AfterSave::NavigateToRuleList,
            })
        }
    }
}
