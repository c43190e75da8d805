use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::models::catalog::CatalogId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulateRequest {
    pub trigger_id: CatalogId,
}

/// Response of `POST /api/rules/simulate-trigger/`. Every field is optional
/// because the backend only reports what it did.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SimulationResult {
    pub simulated_logs_created: Option<Vec<JsonValue>>,
    pub rules_processed_count: Option<u64>,
    pub simulation_errors: Option<Vec<JsonValue>>,
}
