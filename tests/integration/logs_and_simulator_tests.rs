use std::sync::Arc;
use std::time::Duration as StdDuration;

use httpmock::prelude::*;
use serde_json::{json, Value};
use suiteop_dashboard_lib::commands::logs::LogsScreen;
use suiteop_dashboard_lib::commands::simulator::SimulatorScreen;
use suiteop_dashboard_lib::error::AppError;
use suiteop_dashboard_lib::models::notice::NoticeLevel;
use suiteop_dashboard_lib::services::api_client::{ApiClient, WorkflowApi};
use suiteop_dashboard_lib::services::log_viewer::STALE_DATA_NOTICE;

fn api(server: &MockServer) -> Arc<dyn WorkflowApi> {
    Arc::new(
        ApiClient::with_timeout(&server.base_url(), StdDuration::from_secs(2))
            .expect("client builds"),
    )
}

fn log_json(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "workflow_rule": {"id": 1, "name": "Welcome Email"},
        "status": status,
        "trigger_name_snapshot": "Guest checks in",
        "action_name_snapshot": "Send Email",
        "logged_at": "2025-04-29T15:04:05Z",
        "scheduled_execution_time": null,
        "actual_execution_time": "2025-04-29T15:04:06Z",
        "details": "sent"
    })
}

#[tokio::test]
async fn first_load_failure_is_shown_inline() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/workflow-logs/");
            then.status(500).json_body(json!({"error": "database unavailable"}));
        })
        .await;

    let mut screen = LogsScreen::with_api(api(&server), StdDuration::from_secs(10));
    let err = screen.refresh().await.expect_err("500");

    assert_eq!(err.to_string(), "database unavailable");
    assert_eq!(screen.viewer().inline_error(), Some("database unavailable"));
    assert!(screen.viewer().logs().is_empty());
    assert!(!screen.viewer().is_stale());
    assert!(screen.take_notices().is_empty());
}

#[tokio::test]
async fn failed_poll_keeps_last_known_logs() {
    let server = MockServer::start_async().await;
    let mut ok = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/workflow-logs/");
            then.status(200)
                .json_body(json!([log_json(2, "completed"), log_json(1, "failed")]));
        })
        .await;

    let mut screen = LogsScreen::with_api(api(&server), StdDuration::from_secs(10));
    let snapshot = screen.refresh().await.expect("first load");
    assert_eq!(snapshot.logs.len(), 2);
    assert_eq!(snapshot.polls, 1);
    assert!(snapshot.refreshed_at.is_some());

    ok.delete_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/workflow-logs/");
            then.status(502);
        })
        .await;

    screen.refresh().await.expect_err("502");

    let viewer = screen.viewer();
    assert_eq!(viewer.logs().len(), 2);
    assert_eq!(viewer.logs()[0].status, "completed");
    assert!(viewer.is_stale());
    assert_eq!(viewer.inline_error(), None);

    let notices = screen.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    assert_eq!(notices[0].message, STALE_DATA_NOTICE);
}

#[tokio::test]
async fn poller_loads_immediately_and_stops_cleanly() {
    let server = MockServer::start_async().await;
    let logs = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/workflow-logs/");
            then.status(200).json_body(json!([log_json(1, "completed")]));
        })
        .await;

    let screen = LogsScreen::with_api(api(&server), StdDuration::from_millis(50));
    let poller = screen.start_polling();
    let mut updates = poller.subscribe();

    let snapshot = tokio::time::timeout(StdDuration::from_secs(5), async {
        loop {
            updates.changed().await.expect("poller running");
            let snapshot = updates.borrow().clone();
            if snapshot.polls >= 2 {
                return snapshot;
            }
        }
    })
    .await
    .expect("two polls within the timeout");

    assert_eq!(snapshot.logs.len(), 1);
    assert!(!snapshot.stale);

    let viewer = poller.stop().await.expect("poller stops");
    assert!(viewer.logs().len() == 1);
    assert!(logs.hits_async().await >= 2);
}

#[tokio::test]
async fn simulation_reports_summary_and_issues() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/triggers/");
            then.status(200).json_body(json!([
                {"id": 1, "name": "Guest checks in"},
                {"id": 2, "name": "Guest checks out"}
            ]));
        })
        .await;
    let simulate = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/rules/simulate-trigger/")
                .json_body(json!({"trigger_id": 2}));
            then.status(200).json_body(json!({
                "simulated_logs_created": [],
                "rules_processed_count": 0,
                "simulation_errors": [{"rule_id": 7, "details": "Action handler missing"}]
            }));
        })
        .await;

    let mut screen = SimulatorScreen::with_api(api(&server));
    screen.mount().await.expect("triggers load");
    assert_eq!(screen.triggers().len(), 2);

    let result = screen.simulate("2").await.expect("simulated");

    simulate.assert_async().await;
    assert_eq!(result.rules_processed_count, Some(0));
    let notices = screen.take_notices();
    assert_eq!(notices.len(), 2);
    assert_eq!(notices[0].level, NoticeLevel::Success);
    assert_eq!(
        notices[0].message,
        "Trigger \"Guest checks out\" simulated. No active rules found for this trigger."
    );
    assert_eq!(notices[1].level, NoticeLevel::Warning);
    assert_eq!(notices[1].message, "Simulation issue: Action handler missing");
}

#[tokio::test]
async fn simulating_an_unlisted_trigger_sends_nothing() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/triggers/");
            then.status(200).json_body(json!([{"id": 1, "name": "Guest checks in"}]));
        })
        .await;
    let simulate = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/rules/simulate-trigger/");
            then.status(200).json_body(json!({}));
        })
        .await;

    let mut screen = SimulatorScreen::with_api(api(&server));
    screen.mount().await.expect("triggers load");

    assert!(matches!(screen.simulate("9").await, Err(AppError::NotFound)));
    assert_eq!(simulate.hits_async().await, 0);
}

#[tokio::test]
async fn simulator_trigger_load_failure_is_reported() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/triggers/");
            then.status(500);
        })
        .await;

    let mut screen = SimulatorScreen::with_api(api(&server));
    screen.mount().await.expect_err("500");

    assert!(screen.triggers().is_empty());
    assert!(screen.load_error().is_some());
    assert_eq!(
        screen.take_notices()[0].message,
        "Failed to load triggers for simulation."
    );
}
