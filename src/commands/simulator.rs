use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::catalog::CatalogItem;
use crate::models::notice::{Notice, Notices};
use crate::models::simulation::SimulationResult;
use crate::services::api_client::WorkflowApi;
use crate::services::catalog_service::load_triggers;
use crate::services::simulator_service::simulate;

use super::AppState;

/// Developer page that fires a trigger without a real guest event.
pub struct SimulatorScreen {
    api: Arc<dyn WorkflowApi>,
    triggers: Vec<CatalogItem>,
    load_error: Option<String>,
    notices: Notices,
}

impl SimulatorScreen {
    pub fn new(state: &AppState) -> Self {
        Self::with_api(state.api())
    }

    pub fn with_api(api: Arc<dyn WorkflowApi>) -> Self {
        Self {
            api,
            triggers: Vec::new(),
            load_error: None,
            notices: Notices::default(),
        }
    }

    pub async fn mount(&mut self) -> AppResult<()> {
        match load_triggers(self.api.as_ref()).await {
            Ok(triggers) => {
                self.triggers = triggers;
                self.load_error = None;
                Ok(())
            }
            Err(err) => {
                self.load_error = Some(err.to_string());
                self.notices
                    .push(Notice::error("Failed to load triggers for simulation."));
                Err(err)
            }
        }
    }

    pub fn triggers(&self) -> &[CatalogItem] {
        &self.triggers
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take()
    }

    /// Simulates the trigger with id `trigger_id`, which must be one of the
    /// loaded triggers.
    pub async fn simulate(&mut self, trigger_id: &str) -> AppResult<SimulationResult> {
        let trigger = self
            .triggers
            .iter()
            .find(|item| item.id.matches(trigger_id))
            .cloned()
            .ok_or_else(AppError::not_found)?;

        match simulate(self.api.as_ref(), &trigger).await {
            Ok((result, notices)) => {
                for notice in notices {
                    self.notices.push(notice);
                }
                Ok(result)
            }
            Err(err) => {
                self.notices.push(Notice::error(err.to_string()));
                Err(err)
            }
        }
    }
}
