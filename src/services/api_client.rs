use std::time::{Duration as StdDuration, Instant};

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::models::catalog::{CatalogId, CatalogItem, ListEnvelope};
use crate::models::execution_log::ExecutionLog;
use crate::models::rule::{RulePatch, RulePayload, WorkflowRule};
use crate::models::simulation::{SimulateRequest, SimulationResult};
use crate::models::suggestion::{GenerateRequest, GenerateResponse};

const CORRELATION_HEADER: &str = "x-correlation-id";

/// REST contract of the workflow backend. Screens depend on this trait so
/// tests can swap the HTTP client for an in-memory double.
#[async_trait]
pub trait WorkflowApi: Send + Sync {
    async fn list_triggers(&self) -> AppResult<Vec<CatalogItem>>;
    async fn list_actions(&self) -> AppResult<Vec<CatalogItem>>;
    async fn list_rules(&self) -> AppResult<Vec<WorkflowRule>>;
    async fn get_rule(&self, id: &CatalogId) -> AppResult<WorkflowRule>;
    async fn create_rule(&self, payload: &RulePayload) -> AppResult<WorkflowRule>;
    async fn update_rule(&self, id: &CatalogId, payload: &RulePayload) -> AppResult<WorkflowRule>;
    async fn patch_rule(&self, id: &CatalogId, patch: &RulePatch) -> AppResult<WorkflowRule>;
    async fn delete_rule(&self, id: &CatalogId) -> AppResult<()>;
    async fn generate_from_ai(&self, prompt: &str) -> AppResult<GenerateResponse>;
    async fn simulate_trigger(&self, trigger_id: &CatalogId) -> AppResult<SimulationResult>;
    async fn list_logs(&self) -> AppResult<Vec<ExecutionLog>>;
}

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        Self::with_timeout(&config.api_base_url, config.http_timeout)
    }

    pub fn with_timeout(base_url: &str, timeout: StdDuration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Some(StdDuration::from_secs(90)))
            .build()
            .map_err(|err| AppError::other(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute(&self, request: RequestBuilder, operation: &'static str) -> AppResult<Response> {
        let correlation_id = Uuid::new_v4().to_string();
        let start = Instant::now();

        debug!(
            target: "app::api",
            operation,
            correlation_id = %correlation_id,
            "sending request"
        );

        let response = request
            .header(CORRELATION_HEADER, correlation_id.as_str())
            .send()
            .await
            .map_err(|err| error_from_reqwest(err, &correlation_id))?;

        let status = response.status();
        let latency_ms = start.elapsed().as_millis();
        debug!(
            target: "app::api",
            operation,
            correlation_id = %correlation_id,
            status = status.as_u16(),
            latency_ms,
            "backend responded"
        );

        if status.is_success() {
            Ok(response)
        } else {
            warn!(
                target: "app::api",
                operation,
                correlation_id = %correlation_id,
                status = status.as_u16(),
                "backend returned non-success status"
            );
            Err(error_from_response(response).await)
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, operation: &'static str) -> AppResult<T> {
        let request = self.client.get(self.url(path));
        let response = self.execute(request, operation).await?;
        decode_body(response, operation).await
    }

    async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        operation: &'static str,
    ) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.client.request(method, self.url(path)).json(body);
        let response = self.execute(request, operation).await?;
        decode_body(response, operation).await
    }

    async fn list<T: DeserializeOwned>(&self, path: &str, operation: &'static str) -> AppResult<Vec<T>> {
        let envelope: ListEnvelope<T> = self.get(path, operation).await?;
        Ok(envelope.into_items())
    }
}

fn rule_path(id: &CatalogId) -> String {
    format!("/api/rules/{id}/")
}

#[async_trait]
impl WorkflowApi for ApiClient {
    async fn list_triggers(&self) -> AppResult<Vec<CatalogItem>> {
        self.list("/api/triggers/", "listTriggers").await
    }

    async fn list_actions(&self) -> AppResult<Vec<CatalogItem>> {
        self.list("/api/actions/", "listActions").await
    }

    async fn list_rules(&self) -> AppResult<Vec<WorkflowRule>> {
        self.list("/api/rules/", "listRules").await
    }

    async fn get_rule(&self, id: &CatalogId) -> AppResult<WorkflowRule> {
        self.get(&rule_path(id), "getRule").await
    }

    async fn create_rule(&self, payload: &RulePayload) -> AppResult<WorkflowRule> {
        self.send_json(Method::POST, "/api/rules/", payload, "createRule")
            .await
    }

    async fn update_rule(&self, id: &CatalogId, payload: &RulePayload) -> AppResult<WorkflowRule> {
        self.send_json(Method::PUT, &rule_path(id), payload, "updateRule")
            .await
    }

    async fn patch_rule(&self, id: &CatalogId, patch: &RulePatch) -> AppResult<WorkflowRule> {
        self.send_json(Method::PATCH, &rule_path(id), patch, "patchRule")
            .await
    }

    async fn delete_rule(&self, id: &CatalogId) -> AppResult<()> {
        let request = self.client.delete(self.url(&rule_path(id)));
        // 204 carries no body; any 2xx confirms the delete.
        self.execute(request, "deleteRule").await.map(|_| ())
    }

    async fn generate_from_ai(&self, prompt: &str) -> AppResult<GenerateResponse> {
        let body = GenerateRequest {
            prompt: prompt.to_string(),
        };
        self.send_json(
            Method::POST,
            "/api/rules/generate-from-ai/",
            &body,
            "generateFromAi",
        )
        .await
    }

    async fn simulate_trigger(&self, trigger_id: &CatalogId) -> AppResult<SimulationResult> {
        let body = SimulateRequest {
            trigger_id: trigger_id.clone(),
        };
        self.send_json(
            Method::POST,
            "/api/rules/simulate-trigger/",
            &body,
            "simulateTrigger",
        )
        .await
    }

    async fn list_logs(&self) -> AppResult<Vec<ExecutionLog>> {
        self.list("/api/workflow-logs/", "listLogs").await
    }
}

async fn decode_body<T: DeserializeOwned>(response: Response, operation: &'static str) -> AppResult<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|err| AppError::connectivity(format!("{operation}: {err}"), None))?;
    serde_json::from_slice(&bytes)
        .map_err(|err| AppError::invalid_response(format!("{operation}: {err}")))
}

/// Converts a non-success response into an application error, preferring
/// the backend's own wording.
pub async fn error_from_response(response: Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let parsed = serde_json::from_str::<JsonValue>(&body).ok();

    match parsed.as_ref().and_then(extract_backend_message) {
        Some(message) => AppError::api_with_details(status.as_u16(), message, true, parsed),
        None => AppError::api_with_details(status.as_u16(), status_line(status), false, parsed),
    }
}

/// Picks the most specific message out of an error body: `error`, then
/// `message`, then `detail`. Field-level validation errors
/// (`{"name": ["This field is required."]}`) are flattened as a last resort.
pub fn extract_backend_message(body: &JsonValue) -> Option<String> {
    let map = body.as_object()?;

    for key in ["error", "message", "detail"] {
        if let Some(text) = map.get(key).and_then(text_of) {
            return Some(text);
        }
    }

    let field_errors: Vec<String> = map
        .iter()
        .filter_map(|(field, value)| {
            text_of(value).map(|text| {
                if field == "non_field_errors" {
                    text
                } else {
                    format!("{field}: {text}")
                }
            })
        })
        .collect();

    if field_errors.is_empty() {
        None
    } else {
        Some(field_errors.join("; "))
    }
}

fn text_of(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(text) if !text.trim().is_empty() => Some(text.clone()),
        JsonValue::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(text_of).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(" "))
            }
        }
        _ => None,
    }
}

pub fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

fn error_from_reqwest(err: reqwest::Error, correlation_id: &str) -> AppError {
    if err.is_decode() {
        AppError::invalid_response(err.to_string())
    } else if err.is_timeout() {
        AppError::connectivity(format!("request timed out: {err}"), Some(correlation_id))
    } else if err.is_connect() {
        AppError::connectivity(format!("connection failed: {err}"), Some(correlation_id))
    } else {
        AppError::connectivity(err.to_string(), Some(correlation_id))
    }
}
