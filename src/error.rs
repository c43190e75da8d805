use std::fmt;

use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{error, warn};

pub type AppResult<T> = Result<T, AppError>;

pub const CONNECTIVITY_MESSAGE: &str =
    "Could not reach the workflow service. Check your connection and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationCode {
    MissingRequiredField,
    InvalidDelay,
    InvalidIdentifier,
    EmptyPrompt,
    InvalidSelection,
    InvalidFilter,
    InvalidValue,
}

impl ValidationCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationCode::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            ValidationCode::InvalidDelay => "INVALID_DELAY",
            ValidationCode::InvalidIdentifier => "INVALID_IDENTIFIER",
            ValidationCode::EmptyPrompt => "EMPTY_PROMPT",
            ValidationCode::InvalidSelection => "INVALID_SELECTION",
            ValidationCode::InvalidFilter => "INVALID_FILTER",
            ValidationCode::InvalidValue => "INVALID_VALUE",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Could not reach the workflow service. Check your connection and try again.")]
    Connectivity {
        reason: String,
        correlation_id: Option<String>,
    },

    /// Non-success HTTP status. `message` is the backend's own text when it
    /// sent one, otherwise the status line.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        from_backend: bool,
        details: Option<JsonValue>,
    },

    #[error("{message}")]
    Validation {
        code: ValidationCode,
        message: String,
        details: Option<JsonValue>,
    },

    #[error("Unexpected response from the workflow service: {message}")]
    InvalidResponse { message: String },

    #[error("Record not found")]
    NotFound,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn connectivity(reason: impl Into<String>, correlation_id: Option<&str>) -> Self {
        let reason = reason.into();
        match correlation_id {
            Some(id) => warn!(target: "app::api", correlation_id = %id, %reason, "request did not complete"),
            None => warn!(target: "app::api", %reason, "request did not complete"),
        }
        AppError::Connectivity {
            reason,
            correlation_id: correlation_id.map(str::to_string),
        }
    }

    pub fn api(status: u16, message: impl Into<String>, from_backend: bool) -> Self {
        Self::api_with_details(status, message, from_backend, None)
    }

    pub fn api_with_details(
        status: u16,
        message: impl Into<String>,
        from_backend: bool,
        details: Option<JsonValue>,
    ) -> Self {
        let message = message.into();
        if status >= 500 {
            error!(target: "app::api", status, from_backend, %message, "backend returned server error");
        } else {
            warn!(target: "app::api", status, from_backend, %message, "backend rejected request");
        }
        AppError::Api {
            status,
            message,
            from_backend,
            details,
        }
    }

    pub fn validation(code: ValidationCode, message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::validation", code = %code, %message, "validation error");
        AppError::Validation {
            code,
            message,
            details: None,
        }
    }

    pub fn validation_with_details(
        code: ValidationCode,
        message: impl Into<String>,
        details: JsonValue,
    ) -> Self {
        let message = message.into();
        warn!(target: "app::validation", code = %code, %message, details = %details, "validation error with details");
        AppError::Validation {
            code,
            message,
            details: Some(details),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::api", %message, "response body did not decode");
        AppError::InvalidResponse { message }
    }

    pub fn not_found() -> Self {
        warn!(target: "app::rules", "resource not found");
        AppError::NotFound
    }

    pub fn config(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::config", %message, "configuration error");
        AppError::Config(message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::other", %message, "other error");
        AppError::Other(message)
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, AppError::Connectivity { .. })
    }

    pub fn validation_code(&self) -> Option<ValidationCode> {
        match self {
            AppError::Validation { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Backend-provided text for an application error, if the backend sent one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            AppError::Api {
                message,
                from_backend: true,
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }
}
