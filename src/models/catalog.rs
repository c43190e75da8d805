use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend identifier. The API is not consistent about sending ids as
/// numbers or strings, so both are accepted and kept as received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogId {
    Int(i64),
    Text(String),
}

impl CatalogId {
    /// String form used to bind the id to a form control.
    pub fn as_form_value(&self) -> String {
        self.to_string()
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CatalogId::Int(value) => Some(*value),
            CatalogId::Text(value) => value.trim().parse().ok(),
        }
    }

    /// Loose equality used when matching an id typed by the user against
    /// ids received from the backend (`"7"` matches `7`).
    pub fn matches(&self, other: &str) -> bool {
        let other = other.trim();
        match self {
            CatalogId::Int(value) => other.parse::<i64>().map(|v| v == *value).unwrap_or(false),
            CatalogId::Text(value) => value.trim() == other,
        }
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogId::Int(value) => write!(f, "{value}"),
            CatalogId::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for CatalogId {
    fn from(value: i64) -> Self {
        CatalogId::Int(value)
    }
}

impl From<&str> for CatalogId {
    fn from(value: &str) -> Self {
        CatalogId::Text(value.to_string())
    }
}

/// A trigger or an action as served by the backend catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub id: CatalogId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// List endpoints answer with either a bare array or a paginated envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Paginated { results: Vec<T> },
    Plain(Vec<T>),
}

impl<T> ListEnvelope<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListEnvelope::Paginated { results } => results,
            ListEnvelope::Plain(items) => items,
        }
    }
}
