use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, ValidationCode};
use crate::models::catalog::CatalogId;
use crate::models::rule::{RulePatch, RuleType, WorkflowRule};
use crate::services::api_client::WorkflowApi;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    Immediate,
    Scheduled,
}

impl TypeFilter {
    fn admits(self, rule_type: RuleType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Immediate => rule_type == RuleType::Immediate,
            TypeFilter::Scheduled => rule_type == RuleType::Scheduled,
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeFilter::All => "all",
            TypeFilter::Immediate => "immediate",
            TypeFilter::Scheduled => "scheduled",
        })
    }
}

impl FromStr for TypeFilter {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "" | "all" => Ok(TypeFilter::All),
            "immediate" => Ok(TypeFilter::Immediate),
            "scheduled" => Ok(TypeFilter::Scheduled),
            other => Err(AppError::validation(
                ValidationCode::InvalidFilter,
                format!("Unknown rule type filter '{other}' (expected all, immediate or scheduled)"),
            )),
        }
    }
}

/// Client-side filters over the loaded rule list. All set filters must
/// match for a rule to be shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleFilter {
    pub search_term: String,
    pub filter_active: Option<bool>,
    pub filter_type: TypeFilter,
    pub filter_trigger: Option<String>,
}

impl RuleFilter {
    pub fn matches(&self, rule: &WorkflowRule) -> bool {
        if let Some(active) = self.filter_active {
            if rule.is_active != active {
                return false;
            }
        }

        if !self.filter_type.admits(rule.rule_type) {
            return false;
        }

        if let Some(trigger) = self.filter_trigger.as_deref().map(str::trim) {
            if !trigger.is_empty() && !contains_ignore_case(&rule.trigger.name, trigger) {
                return false;
            }
        }

        let term = self.search_term.trim();
        term.is_empty()
            || contains_ignore_case(&rule.name, term)
            || rule
                .description
                .as_deref()
                .is_some_and(|description| contains_ignore_case(description, term))
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// An optimistic change already applied to the list, waiting for the
/// backend to confirm or reject it.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingMutation {
    Toggle {
        id: CatalogId,
        desired: bool,
        previous: WorkflowRule,
    },
    Delete {
        id: CatalogId,
        position: usize,
        removed: WorkflowRule,
    },
}

impl PendingMutation {
    pub fn id(&self) -> &CatalogId {
        match self {
            PendingMutation::Toggle { id, .. } | PendingMutation::Delete { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleList {
    rules: Vec<WorkflowRule>,
}

impl RuleList {
    pub fn new(rules: Vec<WorkflowRule>) -> Self {
        Self { rules }
    }

    pub async fn load(&mut self, api: &dyn WorkflowApi) -> AppResult<()> {
        self.rules = api.list_rules().await?;
        debug!(target: "app::rules", count = self.rules.len(), "rule list loaded");
        Ok(())
    }

    pub fn rules(&self) -> &[WorkflowRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn filtered(&self, filter: &RuleFilter) -> Vec<&WorkflowRule> {
        self.rules.iter().filter(|rule| filter.matches(rule)).collect()
    }

    pub fn find(&self, id: &str) -> Option<&WorkflowRule> {
        self.rules.iter().find(|rule| rule.id.matches(id))
    }

    fn position(&self, id: &str) -> AppResult<usize> {
        self.rules
            .iter()
            .position(|rule| rule.id.matches(id))
            .ok_or_else(AppError::not_found)
    }

    /// Flips `is_active` locally before any request is sent.
    pub fn begin_toggle(&mut self, id: &str, desired: bool) -> AppResult<PendingMutation> {
        let index = self.position(id)?;
        let rule = &mut self.rules[index];
        let previous = rule.clone();
        rule.is_active = desired;

        debug!(target: "app::rules", rule_id = %rule.id, desired, "optimistic toggle applied");
        Ok(PendingMutation::Toggle {
            id: rule.id.clone(),
            desired,
            previous,
        })
    }

    /// Removes the rule locally, remembering where it was.
    pub fn begin_delete(&mut self, id: &str) -> AppResult<PendingMutation> {
        let position = self.position(id)?;
        let removed = self.rules.remove(position);

        debug!(target: "app::rules", rule_id = %removed.id, position, "optimistic delete applied");
        Ok(PendingMutation::Delete {
            id: removed.id.clone(),
            position,
            removed,
        })
    }

    /// Applies the backend's answer to a pending toggle. On failure the
    /// pre-toggle rule is put back and the error is returned.
    pub fn settle_toggle(
        &mut self,
        pending: PendingMutation,
        result: AppResult<WorkflowRule>,
    ) -> AppResult<()> {
        let PendingMutation::Toggle { id, previous, .. } = pending else {
            return Err(AppError::other("settle_toggle called with a delete mutation"));
        };

        match result {
            Ok(server_rule) => {
                self.replace_by_id(&id, server_rule);
                info!(target: "app::rules", rule_id = %id, "toggle confirmed");
                Ok(())
            }
            Err(err) => {
                warn!(target: "app::rules", rule_id = %id, error = %err, "toggle failed, rolling back");
                self.replace_by_id(&id, previous);
                Err(err)
            }
        }
    }

    /// Applies the backend's answer to a pending delete. On failure the rule
    /// is reinserted at its original position.
    pub fn settle_delete(
        &mut self,
        pending: PendingMutation,
        result: AppResult<()>,
    ) -> AppResult<WorkflowRule> {
        let PendingMutation::Delete {
            id,
            position,
            removed,
        } = pending
        else {
            return Err(AppError::other("settle_delete called with a toggle mutation"));
        };

        match result {
            Ok(()) => {
                info!(target: "app::rules", rule_id = %id, "delete confirmed");
                Ok(removed)
            }
            Err(err) => {
                warn!(target: "app::rules", rule_id = %id, error = %err, "delete failed, rolling back");
                let position = position.min(self.rules.len());
                self.rules.insert(position, removed);
                Err(err)
            }
        }
    }

    pub async fn toggle_active(
        &mut self,
        api: &dyn WorkflowApi,
        id: &str,
        desired: bool,
    ) -> AppResult<()> {
        let pending = self.begin_toggle(id, desired)?;
        let result = api.patch_rule(pending.id(), &RulePatch::active(desired)).await;
        self.settle_toggle(pending, result)
    }

    pub async fn delete(&mut self, api: &dyn WorkflowApi, id: &str) -> AppResult<WorkflowRule> {
        let pending = self.begin_delete(id)?;
        let result = api.delete_rule(pending.id()).await;
        self.settle_delete(pending, result)
    }

    fn replace_by_id(&mut self, id: &CatalogId, rule: WorkflowRule) {
        match self.rules.iter_mut().find(|existing| &existing.id == id) {
            Some(existing) => *existing = rule,
            None => debug!(target: "app::rules", rule_id = %id, "rule no longer listed, merge skipped"),
        }
    }
}
