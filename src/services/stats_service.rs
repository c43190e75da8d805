use std::cmp::Reverse;

use serde::Serialize;

use crate::error::AppResult;
use crate::models::rule::{RuleType, WorkflowRule};
use crate::services::api_client::WorkflowApi;
use crate::utils::format::parse_timestamp;

pub const RECENT_WORKFLOW_COUNT: usize = 3;

/// Dashboard counters. Immediate and scheduled only count active rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowStats {
    pub total: usize,
    pub active_immediate: usize,
    pub active_scheduled: usize,
}

impl WorkflowStats {
    pub fn from_rules(rules: &[WorkflowRule]) -> Self {
        let active_of = |rule_type: RuleType| {
            rules
                .iter()
                .filter(|rule| rule.is_active && rule.rule_type == rule_type)
                .count()
        };

        Self {
            total: rules.len(),
            active_immediate: active_of(RuleType::Immediate),
            active_scheduled: active_of(RuleType::Scheduled),
        }
    }
}

/// Newest rules first by the instant `created_at` names, whatever its
/// offset. Rules without a readable timestamp sort last and keep their
/// backend order.
pub fn recent_rules(rules: &[WorkflowRule], limit: usize) -> Vec<&WorkflowRule> {
    let mut ordered: Vec<&WorkflowRule> = rules.iter().collect();
    ordered.sort_by_cached_key(|rule| {
        let created = rule.created_at.as_deref().and_then(parse_timestamp);
        (created.is_none(), Reverse(created))
    });
    ordered.truncate(limit);
    ordered
}

pub async fn load_stats(api: &dyn WorkflowApi) -> AppResult<(WorkflowStats, Vec<WorkflowRule>)> {
    let rules = api.list_rules().await?;
    Ok((WorkflowStats::from_rules(&rules), rules))
}
