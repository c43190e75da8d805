use crate::models::form::{FormState, DEFAULT_DELAY_TIME};
use crate::models::suggestion::{LooseNumber, PreviewWorkflow};

/// Overwrites the form with the contents of a suggestion, or resets it to
/// defaults when `preview` is `None`.
///
/// Delay fields are copied even when the rule type resolves to immediate;
/// the submitter drops them for immediate rules.
pub fn populate_form(form: &mut FormState, preview: Option<&PreviewWorkflow>) {
    let Some(preview) = preview else {
        *form = FormState::default();
        return;
    };

    let mapped = &preview.mapped_suggestion;
    *form = FormState {
        workflow_name: mapped.workflow_name.clone().unwrap_or_default(),
        workflow_description: mapped.workflow_description.clone().unwrap_or_default(),
        selected_trigger: mapped
            .trigger_id
            .as_ref()
            .map(|id| id.as_form_value())
            .unwrap_or_default(),
        selected_action: mapped
            .action_id
            .as_ref()
            .map(|id| id.as_form_value())
            .unwrap_or_default(),
        rule_type: mapped.rule_type.unwrap_or_default(),
        delay_time: mapped
            .delay_time
            .as_ref()
            .map(LooseNumber::form_text)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| DEFAULT_DELAY_TIME.to_string()),
        delay_unit: mapped.delay_unit.unwrap_or_default(),
        is_active: mapped.is_active,
        mapping_notes: preview.mapping_notes.clone(),
    };
}

pub fn populated_form(preview: Option<&PreviewWorkflow>) -> FormState {
    let mut form = FormState::default();
    populate_form(&mut form, preview);
    form
}
