use std::sync::Arc;
use std::time::Duration;

use crate::error::AppResult;
use crate::models::notice::Notice;
use crate::services::api_client::WorkflowApi;
use crate::services::log_viewer::{LogPoller, LogSnapshot, LogViewer};

use super::AppState;

/// Execution log page. A one-shot `refresh` serves `logs`; `start_polling`
/// serves `logs --follow`.
pub struct LogsScreen {
    api: Arc<dyn WorkflowApi>,
    poll_interval: Duration,
    viewer: LogViewer,
}

impl LogsScreen {
    pub fn new(state: &AppState) -> Self {
        Self::with_api(state.api(), state.config().poll_interval)
    }

    pub fn with_api(api: Arc<dyn WorkflowApi>, poll_interval: Duration) -> Self {
        Self {
            api,
            poll_interval,
            viewer: LogViewer::new(),
        }
    }

    pub async fn refresh(&mut self) -> AppResult<LogSnapshot> {
        self.viewer.refresh(self.api.as_ref()).await?;
        Ok(self.viewer.snapshot())
    }

    pub fn viewer(&self) -> &LogViewer {
        &self.viewer
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.viewer.take_notices()
    }

    pub fn start_polling(&self) -> LogPoller {
        LogPoller::spawn(self.api.clone(), self.poll_interval)
    }
}
