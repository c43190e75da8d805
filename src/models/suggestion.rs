use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::models::catalog::CatalogId;
use crate::models::rule::{DelayUnit, RuleType, WorkflowRule};

/// A number the AI may have sent as an integer, a float or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LooseNumber {
    /// Text bound to the delay input of the form.
    pub fn form_text(&self) -> String {
        match self {
            LooseNumber::Int(value) => value.to_string(),
            LooseNumber::Float(value) if value.fract() == 0.0 && value.is_finite() => {
                format!("{}", *value as i64)
            }
            LooseNumber::Float(value) => value.to_string(),
            LooseNumber::Text(value) => value.trim().to_string(),
        }
    }
}

/// Raw suggestion produced by the AI service. Nothing here is trusted.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AiSuggestion {
    pub workflow_name: Option<String>,
    pub workflow_description: Option<String>,
    pub trigger_name: Option<String>,
    pub action_name: Option<String>,
    pub rule_type: Option<String>,
    pub delay_time: Option<LooseNumber>,
    pub delay_unit: Option<String>,
}

/// The backend's resolution of an [`AiSuggestion`] against its catalog,
/// coerced at the boundary: unknown enum text becomes `None`, blank ids
/// become `None`, a missing `is_active` means active.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "RawMappedSuggestion")]
pub struct MappedSuggestion {
    pub workflow_name: Option<String>,
    pub workflow_description: Option<String>,
    pub rule_type: Option<RuleType>,
    pub delay_time: Option<LooseNumber>,
    pub delay_unit: Option<DelayUnit>,
    pub trigger_id: Option<CatalogId>,
    pub trigger_name: Option<String>,
    pub action_id: Option<CatalogId>,
    pub action_name: Option<String>,
    pub is_active: bool,
}

impl Default for MappedSuggestion {
    fn default() -> Self {
        Self {
            workflow_name: None,
            workflow_description: None,
            rule_type: None,
            delay_time: None,
            delay_unit: None,
            trigger_id: None,
            trigger_name: None,
            action_id: None,
            action_name: None,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawMappedSuggestion {
    workflow_name: Option<String>,
    workflow_description: Option<String>,
    rule_type: Option<String>,
    delay_time: Option<LooseNumber>,
    delay_unit: Option<String>,
    trigger_id: Option<CatalogId>,
    trigger_name: Option<String>,
    action_id: Option<CatalogId>,
    action_name: Option<String>,
    is_active: Option<bool>,
}

impl From<RawMappedSuggestion> for MappedSuggestion {
    fn from(raw: RawMappedSuggestion) -> Self {
        Self {
            workflow_name: raw.workflow_name,
            workflow_description: raw.workflow_description,
            rule_type: raw.rule_type.and_then(|value| value.parse().ok()),
            delay_time: raw.delay_time,
            delay_unit: raw.delay_unit.and_then(|value| value.parse().ok()),
            trigger_id: raw.trigger_id.filter(|id| !id.to_string().trim().is_empty()),
            trigger_name: raw.trigger_name,
            action_id: raw.action_id.filter(|id| !id.to_string().trim().is_empty()),
            action_name: raw.action_name,
            is_active: raw.is_active.unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PreviewWorkflow {
    #[serde(default)]
    pub ai_suggestion: AiSuggestion,
    #[serde(default)]
    pub mapped_suggestion: MappedSuggestion,
    #[serde(default)]
    pub mapping_notes: Vec<String>,
}

pub const UNNAMED_WORKFLOW: &str = "Unnamed Workflow";

impl PreviewWorkflow {
    pub fn label(&self) -> &str {
        self.mapped_suggestion
            .workflow_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(UNNAMED_WORKFLOW)
    }

    /// True when both trigger and action were matched to catalog entries.
    pub fn is_fully_mapped(&self) -> bool {
        self.mapped_suggestion.trigger_id.is_some() && self.mapped_suggestion.action_id.is_some()
    }
}

/// A structural problem the AI or the backend reported for the prompt as a
/// whole. The shape is not fixed, so the raw JSON is kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct AiReportedError(pub JsonValue);

impl AiReportedError {
    pub fn summary(&self) -> String {
        describe_soft_error(&self.0)
    }
}

/// Text for a loosely typed error object: `error`, then `message`, then
/// `details` (text or JSON), then the object itself.
pub fn describe_soft_error(value: &JsonValue) -> String {
    match value {
        JsonValue::String(text) => text.clone(),
        JsonValue::Object(map) => {
            for key in ["error", "message"] {
                if let Some(text) = map.get(key).and_then(JsonValue::as_str) {
                    return text.to_string();
                }
            }
            match map.get("details") {
                Some(JsonValue::String(text)) => text.clone(),
                Some(other) if !other.is_null() => other.to_string(),
                _ => value.to_string(),
            }
        }
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateRequest {
    pub prompt: String,
}

/// Response of `POST /api/rules/generate-from-ai/`. The preview flow fills
/// `preview_workflows`; older backends created rules directly and answer
/// with `created_workflows`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct GenerateResponse {
    pub preview_workflows: Vec<PreviewWorkflow>,
    pub created_workflows: Vec<WorkflowRule>,
    pub ai_reported_errors: Vec<AiReportedError>,
    pub message: Option<String>,
}
