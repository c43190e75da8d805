use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::execution_log::ExecutionLog;
use crate::models::notice::{Notice, Notices};
use crate::services::api_client::WorkflowApi;

pub const STALE_DATA_NOTICE: &str = "Could not refresh execution logs; displaying last known data.";

/// What a log display renders after a load or poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogSnapshot {
    pub logs: Vec<ExecutionLog>,
    /// Set when nothing has ever loaded and the last attempt failed.
    pub inline_error: Option<String>,
    /// Set when the last poll failed but earlier data is still shown.
    pub stale: bool,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub polls: u64,
}

/// Execution log list with poll bookkeeping.
#[derive(Debug, Default)]
pub struct LogViewer {
    logs: Vec<ExecutionLog>,
    loaded: bool,
    inline_error: Option<String>,
    stale: bool,
    refreshed_at: Option<DateTime<Utc>>,
    polls: u64,
    notices: Notices,
}

impl LogViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches the log list and replaces what is displayed. A failure keeps
    /// the previous list; if there is none yet the error is shown inline.
    /// The stale-data notice is raised once per outage, not once per poll.
    pub async fn refresh(&mut self, api: &dyn WorkflowApi) -> AppResult<()> {
        self.polls += 1;
        match api.list_logs().await {
            Ok(logs) => {
                debug!(target: "app::logs", count = logs.len(), poll = self.polls, "logs refreshed");
                self.logs = logs;
                self.loaded = true;
                self.inline_error = None;
                self.stale = false;
                self.refreshed_at = Some(Utc::now());
                Ok(())
            }
            Err(err) => {
                if self.loaded {
                    warn!(target: "app::logs", error = %err, "log poll failed, keeping last known data");
                    if !self.stale {
                        self.notices.push(Notice::warning(STALE_DATA_NOTICE));
                    }
                    self.stale = true;
                } else {
                    warn!(target: "app::logs", error = %err, "initial log load failed");
                    self.inline_error = Some(err.to_string());
                }
                Err(err)
            }
        }
    }

    pub fn logs(&self) -> &[ExecutionLog] {
        &self.logs
    }

    pub fn inline_error(&self) -> Option<&str> {
        self.inline_error.as_deref()
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take()
    }

    pub fn snapshot(&self) -> LogSnapshot {
        LogSnapshot {
            logs: self.logs.clone(),
            inline_error: self.inline_error.clone(),
            stale: self.stale,
            refreshed_at: self.refreshed_at,
            polls: self.polls,
        }
    }
}

/// Running poll loop. Dropping the handle does not stop the task; call
/// [`LogPoller::stop`].
pub struct LogPoller {
    snapshots: watch::Receiver<LogSnapshot>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<LogViewer>,
}

impl LogPoller {
    /// Loads immediately, then every `period`. Each poll awaits the previous
    /// one, and ticks missed while a request is slow are delayed rather
    /// than fired in a burst.
    pub fn spawn(api: Arc<dyn WorkflowApi>, period: Duration) -> Self {
        let (snapshot_tx, snapshots) = watch::channel(LogSnapshot::default());
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut viewer = LogViewer::new();
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(target: "app::logs", period_secs = period.as_secs(), "log polling started");
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // Failures are recorded in the viewer state.
                        let _ = viewer.refresh(api.as_ref()).await;
                        // Subscribers read staleness from the snapshot.
                        viewer.take_notices();
                        if snapshot_tx.send(viewer.snapshot()).is_err() {
                            break;
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            info!(target: "app::logs", polls = viewer.polls, "log polling stopped");
            viewer
        });

        Self {
            snapshots,
            shutdown,
            task,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LogSnapshot> {
        self.snapshots.clone()
    }

    pub fn latest(&self) -> LogSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Signals the loop to stop and returns the viewer it owned.
    pub async fn stop(self) -> AppResult<LogViewer> {
        let _ = self.shutdown.send(true);
        self.task
            .await
            .map_err(|err| AppError::other(format!("log poller task failed: {err}")))
    }
}
