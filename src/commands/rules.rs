use std::sync::Arc;

use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::catalog::CatalogId;
use crate::models::notice::{Notice, Notices};
use crate::models::rule::WorkflowRule;
use crate::services::api_client::WorkflowApi;
use crate::services::rule_list::{RuleFilter, RuleList};
use crate::services::stats_service::{recent_rules, WorkflowStats};

use super::AppState;

/// The workflows page: the loaded rule list, its filters and the
/// delete confirmation.
pub struct RulesScreen {
    api: Arc<dyn WorkflowApi>,
    list: RuleList,
    filter: RuleFilter,
    load_error: Option<String>,
    pending_delete: Option<CatalogId>,
    notices: Notices,
}

impl RulesScreen {
    pub fn new(state: &AppState) -> Self {
        Self::with_api(state.api())
    }

    pub fn with_api(api: Arc<dyn WorkflowApi>) -> Self {
        Self {
            api,
            list: RuleList::default(),
            filter: RuleFilter::default(),
            load_error: None,
            pending_delete: None,
            notices: Notices::default(),
        }
    }

    pub async fn mount(&mut self) -> AppResult<()> {
        match self.list.load(self.api.as_ref()).await {
            Ok(()) => {
                self.load_error = None;
                Ok(())
            }
            Err(err) => {
                self.load_error = Some(err.to_string());
                self.notices.push(Notice::error("Failed to load workflows."));
                Err(err)
            }
        }
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn list(&self) -> &RuleList {
        &self.list
    }

    /// Direct access for callers that drive the two-phase mutations.
    pub fn list_mut(&mut self) -> &mut RuleList {
        &mut self.list
    }

    pub fn filter(&self) -> &RuleFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: RuleFilter) {
        self.filter = filter;
    }

    pub fn visible(&self) -> Vec<&WorkflowRule> {
        self.list.filtered(&self.filter)
    }

    pub fn stats(&self) -> WorkflowStats {
        WorkflowStats::from_rules(self.list.rules())
    }

    pub fn recent(&self, limit: usize) -> Vec<&WorkflowRule> {
        recent_rules(self.list.rules(), limit)
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take()
    }

    pub async fn toggle(&mut self, id: &str, desired: bool) -> AppResult<()> {
        match self.list.toggle_active(self.api.as_ref(), id, desired).await {
            Ok(()) => {
                let name = self
                    .list
                    .find(id)
                    .map(|rule| rule.name.clone())
                    .unwrap_or_else(|| id.to_string());
                let state = if desired { "activated" } else { "deactivated" };
                self.notices
                    .push(Notice::success(format!("Workflow \"{name}\" {state}.")));
                Ok(())
            }
            Err(err) => {
                self.notices
                    .push(Notice::error(format!("Failed to update workflow: {err}")));
                Err(err)
            }
        }
    }

    /// First step of a delete. Returns the confirmation prompt; nothing is
    /// removed until [`RulesScreen::confirm_delete`].
    pub fn request_delete(&mut self, id: &str) -> AppResult<String> {
        let rule = self.list.find(id).ok_or_else(AppError::not_found)?;
        let prompt = format!(
            "Are you sure you want to delete \"{}\"? This action cannot be undone.",
            rule.name
        );
        self.pending_delete = Some(rule.id.clone());
        Ok(prompt)
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn pending_delete(&self) -> Option<&CatalogId> {
        self.pending_delete.as_ref()
    }

    pub async fn confirm_delete(&mut self) -> AppResult<WorkflowRule> {
        let Some(id) = self.pending_delete.take() else {
            return Err(AppError::other("No workflow is awaiting delete confirmation"));
        };

        match self.list.delete(self.api.as_ref(), &id.to_string()).await {
            Ok(removed) => {
                info!(target: "app::command", rule_id = %removed.id, "workflow deleted");
                self.notices.push(Notice::success(format!(
                    "Workflow \"{}\" deleted.",
                    removed.name
                )));
                Ok(removed)
            }
            Err(err) => {
                self.notices
                    .push(Notice::error(format!("Failed to delete workflow: {err}")));
                Err(err)
            }
        }
    }
}
