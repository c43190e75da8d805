use std::sync::Arc;

use tracing::debug;

use crate::error::AppResult;
use crate::models::catalog::CatalogId;
use crate::models::form::FormState;
use crate::models::notice::{Notice, Notices};
use crate::models::rule::WorkflowRule;
use crate::services::api_client::WorkflowApi;
use crate::services::catalog_service::{load_catalog, Catalog};
use crate::services::rule_submitter::{submit_rule, SubmitMode, SubmitOutcome};

use super::AppState;

/// Edit page for one persisted rule. The form is seeded from the rule and
/// saved with a full replace.
pub struct EditScreen {
    api: Arc<dyn WorkflowApi>,
    rule_id: CatalogId,
    rule: WorkflowRule,
    catalog: Catalog,
    form: FormState,
    notices: Notices,
}

impl EditScreen {
    pub async fn open(state: &AppState, rule_id: &str) -> AppResult<Self> {
        Self::open_with_api(state.api(), rule_id).await
    }

    /// Fetches the rule and the catalog together. A missing rule fails the
    /// whole screen; a missing catalog only raises notices.
    pub async fn open_with_api(api: Arc<dyn WorkflowApi>, rule_id: &str) -> AppResult<Self> {
        let rule_id = CatalogId::Text(rule_id.trim().to_string());
        let (load, rule) = tokio::join!(load_catalog(api.as_ref()), api.get_rule(&rule_id));
        let rule = rule?;

        let mut notices = Notices::default();
        if load.trigger_error.is_some() {
            notices.push(Notice::error("Failed to load triggers."));
        }
        if load.action_error.is_some() {
            notices.push(Notice::error("Failed to load actions."));
        }

        debug!(target: "app::command", rule_id = %rule.id, "edit screen opened");
        Ok(Self {
            api,
            rule_id: rule.id.clone(),
            form: FormState::from_rule(&rule),
            rule,
            catalog: load.catalog,
            notices,
        })
    }

    pub fn rule(&self) -> &WorkflowRule {
        &self.rule
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take()
    }

    /// Sends the edited form. On success the caller should return to the
    /// rule list; on failure the form is kept as typed.
    pub async fn save(&mut self) -> AppResult<SubmitOutcome> {
        let mode = SubmitMode::Update(self.rule_id.clone());
        match submit_rule(self.api.as_ref(), &mut self.form, &mode).await {
            Ok(outcome) => {
                self.notices.push(Notice::success(outcome.message.clone()));
                self.rule = outcome.rule.clone();
                Ok(outcome)
            }
            Err(err) => {
                self.notices.push(Notice::error(err.to_string()));
                Err(err)
            }
        }
    }
}
