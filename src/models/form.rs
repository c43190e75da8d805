use serde::{Deserialize, Serialize};

use crate::models::rule::{DelayUnit, RuleType, WorkflowRule};

pub const DEFAULT_DELAY_TIME: &str = "15";

/// Draft of a rule being authored or edited. Trigger and action hold the
/// string form of the selected catalog id; an empty string means nothing
/// is selected yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormState {
    pub workflow_name: String,
    pub workflow_description: String,
    pub selected_trigger: String,
    pub selected_action: String,
    pub rule_type: RuleType,
    pub delay_time: String,
    pub delay_unit: DelayUnit,
    pub is_active: bool,
    pub mapping_notes: Vec<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            workflow_name: String::new(),
            workflow_description: String::new(),
            selected_trigger: String::new(),
            selected_action: String::new(),
            rule_type: RuleType::Immediate,
            delay_time: DEFAULT_DELAY_TIME.to_string(),
            delay_unit: DelayUnit::Minutes,
            is_active: true,
            mapping_notes: Vec::new(),
        }
    }
}

impl FormState {
    /// Seeds the edit form from a persisted rule.
    pub fn from_rule(rule: &WorkflowRule) -> Self {
        Self {
            workflow_name: rule.name.clone(),
            workflow_description: rule.description.clone().unwrap_or_default(),
            selected_trigger: rule.trigger.id.as_form_value(),
            selected_action: rule.action.id.as_form_value(),
            rule_type: rule.rule_type,
            delay_time: rule
                .delay_time
                .map(|time| time.to_string())
                .unwrap_or_else(|| DEFAULT_DELAY_TIME.to_string()),
            delay_unit: rule
                .delay_unit
                .as_deref()
                .and_then(|unit| unit.parse().ok())
                .unwrap_or_default(),
            is_active: rule.is_active,
            mapping_notes: Vec::new(),
        }
    }

    pub fn has_required_fields(&self) -> bool {
        !self.workflow_name.trim().is_empty()
            && !self.selected_trigger.trim().is_empty()
            && !self.selected_action.trim().is_empty()
    }
}
