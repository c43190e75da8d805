use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::models::catalog::CatalogItem;
use crate::services::api_client::WorkflowApi;

/// Triggers and actions available for selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub triggers: Vec<CatalogItem>,
    pub actions: Vec<CatalogItem>,
}

impl Catalog {
    /// Looks a trigger up by the string form bound to the form control.
    pub fn trigger(&self, selected: &str) -> Option<&CatalogItem> {
        self.triggers.iter().find(|item| item.id.matches(selected))
    }

    pub fn action(&self, selected: &str) -> Option<&CatalogItem> {
        self.actions.iter().find(|item| item.id.matches(selected))
    }

    /// Case-insensitive exact name match, used when the user types a name
    /// instead of an id.
    pub fn trigger_by_name(&self, name: &str) -> Option<&CatalogItem> {
        find_by_name(&self.triggers, name)
    }

    pub fn action_by_name(&self, name: &str) -> Option<&CatalogItem> {
        find_by_name(&self.actions, name)
    }
}

fn find_by_name<'a>(items: &'a [CatalogItem], name: &str) -> Option<&'a CatalogItem> {
    let needle = name.trim().to_lowercase();
    items
        .iter()
        .find(|item| item.name.trim().to_lowercase() == needle)
}

/// Result of a mount-time catalog fetch. The two lists load independently,
/// so one may succeed while the other fails.
#[derive(Debug)]
pub struct CatalogLoad {
    pub catalog: Catalog,
    pub trigger_error: Option<AppError>,
    pub action_error: Option<AppError>,
}

impl CatalogLoad {
    pub fn is_complete(&self) -> bool {
        self.trigger_error.is_none() && self.action_error.is_none()
    }
}

/// Fetches triggers and actions concurrently.
pub async fn load_catalog(api: &dyn WorkflowApi) -> CatalogLoad {
    let (triggers, actions) = tokio::join!(api.list_triggers(), api.list_actions());

    let mut load = CatalogLoad {
        catalog: Catalog::default(),
        trigger_error: None,
        action_error: None,
    };

    match triggers {
        Ok(items) => load.catalog.triggers = items,
        Err(err) => {
            warn!(target: "app::catalog", error = %err, "failed to load triggers");
            load.trigger_error = Some(err);
        }
    }

    match actions {
        Ok(items) => load.catalog.actions = items,
        Err(err) => {
            warn!(target: "app::catalog", error = %err, "failed to load actions");
            load.action_error = Some(err);
        }
    }

    debug!(
        target: "app::catalog",
        triggers = load.catalog.triggers.len(),
        actions = load.catalog.actions.len(),
        "catalog loaded"
    );
    load
}

pub async fn load_triggers(api: &dyn WorkflowApi) -> AppResult<Vec<CatalogItem>> {
    api.list_triggers().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::CatalogId;

    fn item(id: i64, name: &str) -> CatalogItem {
        CatalogItem {
            id: CatalogId::Int(id),
            name: name.to_string(),
            description: None,
        }
    }

    #[test]
    fn lookups_match_ids_and_names() {
        let catalog = Catalog {
            triggers: vec![item(1, "Guest checks in"), item(2, "Guest checks out")],
            actions: vec![item(10, "Send Email")],
        };

        assert_eq!(catalog.trigger("2").map(|t| t.name.as_str()), Some("Guest checks out"));
        assert!(catalog.trigger("3").is_none());
        assert_eq!(
            catalog.trigger_by_name("guest CHECKS in").map(|t| t.id.clone()),
            Some(CatalogId::Int(1))
        );
        assert_eq!(catalog.action("10").map(|a| a.name.as_str()), Some("Send Email"));
        assert!(catalog.action_by_name("Send Fax").is_none());
    }
}
