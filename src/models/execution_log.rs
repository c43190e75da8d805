use serde::{Deserialize, Serialize};

use crate::models::catalog::CatalogId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleRef {
    pub id: CatalogId,
    pub name: String,
}

/// One row of `/api/workflow-logs/`. Trigger and action names are
/// snapshots taken when the rule fired.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionLog {
    pub id: CatalogId,
    pub workflow_rule: RuleRef,
    pub status: String,
    #[serde(default)]
    pub trigger_name_snapshot: String,
    #[serde(default)]
    pub action_name_snapshot: String,
    pub logged_at: String,
    #[serde(default)]
    pub scheduled_execution_time: Option<String>,
    #[serde(default)]
    pub actual_execution_time: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}
