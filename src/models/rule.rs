use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::catalog::{CatalogId, CatalogItem};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    #[default]
    Immediate,
    Scheduled,
}

impl RuleType {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleType::Immediate => "immediate",
            RuleType::Scheduled => "scheduled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RuleType::Immediate => "Immediate",
            RuleType::Scheduled => "Scheduled",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "immediate" => Ok(RuleType::Immediate),
            "scheduled" => Ok(RuleType::Scheduled),
            other => Err(format!("unknown rule type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DelayUnit {
    #[default]
    Minutes,
    Hours,
    Days,
}

impl DelayUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            DelayUnit::Minutes => "minutes",
            DelayUnit::Hours => "hours",
            DelayUnit::Days => "days",
        }
    }
}

impl fmt::Display for DelayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DelayUnit {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "minutes" => Ok(DelayUnit::Minutes),
            "hours" => Ok(DelayUnit::Hours),
            "days" => Ok(DelayUnit::Days),
            other => Err(format!("unknown delay unit '{other}'")),
        }
    }
}

/// A persisted rule as returned by `/api/rules/`, with trigger and action
/// expanded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowRule {
    pub id: CatalogId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub trigger: CatalogItem,
    pub action: CatalogItem,
    #[serde(default)]
    pub rule_type: RuleType,
    #[serde(default)]
    pub delay_time: Option<i64>,
    #[serde(default)]
    pub delay_unit: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl WorkflowRule {
    /// Human readable firing mode, e.g. `Scheduled (2 hours)`.
    pub fn schedule_label(&self) -> String {
        match (self.rule_type, self.delay_time, self.delay_unit.as_deref()) {
            (RuleType::Scheduled, Some(time), Some(unit)) => format!("Scheduled ({time} {unit})"),
            (rule_type, _, _) => rule_type.label().to_string(),
        }
    }
}

fn default_active() -> bool {
    true
}

/// Body of `POST /api/rules/` and `PUT /api/rules/{id}/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RulePayload {
    pub name: String,
    pub description: String,
    pub trigger_id: i64,
    pub action_id: i64,
    pub rule_type: RuleType,
    pub is_active: bool,
    pub delay_time: Option<i64>,
    pub delay_unit: Option<DelayUnit>,
}

/// Body of `PATCH /api/rules/{id}/`. Only set fields are sent.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RulePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RulePatch {
    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Default::default()
        }
    }
}
