pub mod create;
pub mod edit;
pub mod logs;
pub mod rules;
pub mod simulator;

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Map as JsonMap, Value as JsonValue};
use tracing::{error, warn};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult, CONNECTIVITY_MESSAGE};
use crate::services::api_client::{ApiClient, WorkflowApi};

/// Shared handles every screen is built from.
#[derive(Clone)]
pub struct AppState {
    config: AppConfig,
    api: Arc<dyn WorkflowApi>,
}

impl AppState {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let client = ApiClient::new(&config)?;
        Ok(Self {
            config,
            api: Arc::new(client),
        })
    }

    /// Builds state around an existing backend implementation.
    pub fn with_api(config: AppConfig, api: Arc<dyn WorkflowApi>) -> Self {
        Self { config, api }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn api(&self) -> Arc<dyn WorkflowApi> {
        Arc::clone(&self.api)
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

/// Serializable projection of [`AppError`] used for `--format json`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl CommandError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<AppError> for CommandError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Connectivity {
                reason,
                correlation_id,
            } => {
                let mut details = JsonMap::new();
                details.insert("reason".to_string(), JsonValue::String(reason));
                if let Some(id) = correlation_id {
                    details.insert("correlationId".to_string(), JsonValue::String(id));
                }
                CommandError::new(
                    "CONNECTIVITY",
                    CONNECTIVITY_MESSAGE,
                    Some(JsonValue::Object(details)),
                )
            }
            AppError::Api {
                status,
                message,
                from_backend,
                details,
            } => {
                let mut merged = JsonMap::new();
                merged.insert("status".to_string(), json!(status));
                merged.insert("fromBackend".to_string(), json!(from_backend));
                if let Some(body) = details {
                    merged.insert("body".to_string(), body);
                }
                CommandError::new("HTTP_ERROR", message, Some(JsonValue::Object(merged)))
            }
            AppError::Validation {
                code,
                message,
                details,
            } => CommandError::new(code.as_str(), message, details),
            AppError::InvalidResponse { message } => {
                error!(target: "app::command", %message, "invalid backend response in command");
                CommandError::new(
                    "INVALID_RESPONSE",
                    "The workflow service sent a response that could not be read",
                    Some(json!({ "reason": message })),
                )
            }
            AppError::NotFound => CommandError::new("NOT_FOUND", "Workflow not found", None),
            AppError::Config(message) => {
                warn!(target: "app::command", %message, "configuration error in command");
                CommandError::new("CONFIG", message, None)
            }
            AppError::Serialization(error) => {
                error!(target: "app::command", error = %error, "serialization error in command");
                CommandError::new("UNKNOWN", "Serialization failed", None)
            }
            AppError::Io(error) => {
                error!(target: "app::command", error = %error, "io error in command");
                CommandError::new("UNKNOWN", "File system access failed", None)
            }
            AppError::Other(message) => {
                error!(target: "app::command", %message, "unexpected error in command");
                CommandError::new("UNKNOWN", message, None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationCode;

    #[test]
    fn connectivity_uses_friendly_message() {
        let error = CommandError::from(AppError::Connectivity {
            reason: "connection refused".into(),
            correlation_id: Some("abc".into()),
        });
        assert_eq!(error.code, "CONNECTIVITY");
        assert_eq!(error.message, CONNECTIVITY_MESSAGE);
        assert_eq!(
            error.details,
            Some(json!({"reason": "connection refused", "correlationId": "abc"}))
        );
    }

    #[test]
    fn validation_keeps_its_code() {
        let error = CommandError::from(AppError::Validation {
            code: ValidationCode::InvalidDelay,
            message: "Delay must be positive".into(),
            details: None,
        });
        assert_eq!(error.code, "INVALID_DELAY");
        assert_eq!(error.to_string(), "Delay must be positive");
    }

    #[test]
    fn api_errors_carry_status() {
        let error = CommandError::from(AppError::Api {
            status: 400,
            message: "name: This field is required.".into(),
            from_backend: true,
            details: None,
        });
        assert_eq!(error.code, "HTTP_ERROR");
        assert_eq!(error.details, Some(json!({"status": 400, "fromBackend": true})));
    }
}
