use std::sync::Arc;
use std::time::Duration as StdDuration;

use httpmock::prelude::*;
use httpmock::Method::PATCH;
use serde_json::{json, Value};
use suiteop_dashboard_lib::commands::edit::EditScreen;
use suiteop_dashboard_lib::commands::rules::RulesScreen;
use suiteop_dashboard_lib::error::AppError;
use suiteop_dashboard_lib::models::notice::NoticeLevel;
use suiteop_dashboard_lib::models::rule::RuleType;
use suiteop_dashboard_lib::services::api_client::{ApiClient, WorkflowApi};
use suiteop_dashboard_lib::services::rule_list::{RuleFilter, TypeFilter};
use suiteop_dashboard_lib::services::rule_submitter::AfterSave;
use suiteop_dashboard_lib::services::stats_service::WorkflowStats;

fn api(server: &MockServer) -> Arc<dyn WorkflowApi> {
    Arc::new(
        ApiClient::with_timeout(&server.base_url(), StdDuration::from_secs(2))
            .expect("client builds"),
    )
}

fn rule_json(id: i64, name: &str, trigger: &str, rule_type: &str, active: bool, created: &str) -> Value {
    let (delay_time, delay_unit) = if rule_type == "scheduled" {
        (json!(1), json!("hours"))
    } else {
        (Value::Null, Value::Null)
    };
    json!({
        "id": id,
        "name": name,
        "description": format!("{name} for guests"),
        "trigger": {"id": id * 10, "name": trigger},
        "action": {"id": 1, "name": "Send Email"},
        "rule_type": rule_type,
        "delay_time": delay_time,
        "delay_unit": delay_unit,
        "is_active": active,
        "created_at": created,
        "updated_at": created
    })
}

fn seeded_rules() -> Value {
    json!([
        rule_json(1, "Welcome Email", "Guest checks in", "immediate", true, "2025-04-01T09:00:00Z"),
        rule_json(2, "Cleaning Reminder", "Guest checks out", "scheduled", true, "2025-04-03T09:00:00Z"),
        rule_json(3, "Review Request", "Guest checks out", "scheduled", false, "2025-04-02T09:00:00Z"),
        rule_json(4, "Late Checkout Offer", "Booking confirmed", "immediate", false, "2025-04-04T09:00:00Z")
    ])
}

async fn mounted(server: &MockServer) -> RulesScreen {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/rules/");
            then.status(200).json_body(seeded_rules());
        })
        .await;

    let mut screen = RulesScreen::with_api(api(server));
    screen.mount().await.expect("rules load");
    screen
}

fn names(screen: &RulesScreen) -> Vec<String> {
    screen.list().rules().iter().map(|rule| rule.name.clone()).collect()
}

#[tokio::test]
async fn toggle_success_merges_server_copy() {
    let server = MockServer::start_async().await;
    let mut screen = mounted(&server).await;
    let mut updated = rule_json(3, "Review Request", "Guest checks out", "scheduled", true, "2025-04-02T09:00:00Z");
    updated["updated_at"] = json!("2025-05-01T10:00:00Z");

    let patch = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/api/rules/3/")
                .json_body(json!({"is_active": true}));
            then.status(200).json_body(updated);
        })
        .await;

    screen.toggle("3", true).await.expect("toggled");

    patch.assert_async().await;
    let rule = screen.list().find("3").expect("still listed");
    assert!(rule.is_active);
    assert_eq!(rule.updated_at.as_deref(), Some("2025-05-01T10:00:00Z"));

    let notices = screen.take_notices();
    assert_eq!(notices[0].level, NoticeLevel::Success);
    assert_eq!(notices[0].message, "Workflow \"Review Request\" activated.");
}

#[tokio::test]
async fn toggle_failure_rolls_back_only_that_rule() {
    let server = MockServer::start_async().await;
    let mut screen = mounted(&server).await;
    let before = screen.list().clone();

    server
        .mock_async(|when, then| {
            when.method(PATCH).path("/api/rules/2/");
            then.status(500);
        })
        .await;

    let err = screen.toggle("2", false).await.expect_err("500");

    assert_eq!(err.status(), Some(500));
    assert_eq!(screen.list(), &before);
    let notices = screen.take_notices();
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].message.starts_with("Failed to update workflow:"));
}

#[tokio::test]
async fn delete_requires_confirmation() {
    let server = MockServer::start_async().await;
    let mut screen = mounted(&server).await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/api/rules/2/");
            then.status(204);
        })
        .await;

    let prompt = screen.request_delete("2").expect("rule exists");
    assert_eq!(
        prompt,
        "Are you sure you want to delete \"Cleaning Reminder\"? This action cannot be undone."
    );
    screen.cancel_delete();
    assert!(screen.pending_delete().is_none());
    assert_eq!(screen.list().len(), 4);
    assert_eq!(delete.hits_async().await, 0);

    screen.request_delete("2").expect("rule exists");
    let removed = screen.confirm_delete().await.expect("deleted");

    delete.assert_async().await;
    assert_eq!(removed.name, "Cleaning Reminder");
    assert_eq!(
        names(&screen),
        vec!["Welcome Email", "Review Request", "Late Checkout Offer"]
    );
    assert!(screen
        .take_notices()
        .iter()
        .any(|notice| notice.message == "Workflow \"Cleaning Reminder\" deleted."));
}

#[tokio::test]
async fn failed_delete_restores_original_position() {
    let server = MockServer::start_async().await;
    let mut screen = mounted(&server).await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).path("/api/rules/3/");
            then.status(403).json_body(json!({"detail": "You do not have permission."}));
        })
        .await;

    screen.request_delete("3").expect("rule exists");
    let err = screen.confirm_delete().await.expect_err("403");

    assert_eq!(err.to_string(), "You do not have permission.");
    assert_eq!(
        names(&screen),
        vec!["Welcome Email", "Cleaning Reminder", "Review Request", "Late Checkout Offer"]
    );
    let notices = screen.take_notices();
    assert_eq!(
        notices[0].message,
        "Failed to delete workflow: You do not have permission."
    );
}

#[tokio::test]
async fn unknown_rule_ids_are_not_found() {
    let server = MockServer::start_async().await;
    let mut screen = mounted(&server).await;

    assert!(matches!(screen.request_delete("99"), Err(AppError::NotFound)));
    assert!(matches!(screen.toggle("99", true).await, Err(AppError::NotFound)));
    assert!(screen.confirm_delete().await.is_err());
}

#[tokio::test]
async fn filters_combine_and_stats_count_active_rules() {
    let server = MockServer::start_async().await;
    let mut screen = mounted(&server).await;

    assert_eq!(
        screen.stats(),
        WorkflowStats {
            total: 4,
            active_immediate: 1,
            active_scheduled: 1,
        }
    );
    let recent: Vec<&str> = screen.recent(3).into_iter().map(|rule| rule.name.as_str()).collect();
    assert_eq!(recent, vec!["Late Checkout Offer", "Cleaning Reminder", "Review Request"]);

    screen.set_filter(RuleFilter {
        filter_trigger: Some("checks OUT".into()),
        ..Default::default()
    });
    assert_eq!(screen.visible().len(), 2);

    screen.set_filter(RuleFilter {
        filter_trigger: Some("checks out".into()),
        filter_active: Some(false),
        ..Default::default()
    });
    let visible = screen.visible();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].name, "Review Request");

    screen.set_filter(RuleFilter {
        search_term: "for GUESTS".into(),
        filter_type: "immediate".parse::<TypeFilter>().expect("filter"),
        ..Default::default()
    });
    let visible = screen.visible();
    assert_eq!(visible.len(), 2);
    assert!(visible.iter().all(|rule| rule.rule_type == RuleType::Immediate));
}

#[tokio::test]
async fn failed_load_reports_and_keeps_empty_list() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/rules/");
            then.status(503);
        })
        .await;

    let mut screen = RulesScreen::with_api(api(&server));
    screen.mount().await.expect_err("503");

    assert!(screen.list().is_empty());
    assert!(screen.load_error().is_some());
    assert_eq!(screen.take_notices()[0].message, "Failed to load workflows.");
}

#[tokio::test]
async fn edit_screen_replaces_rule_and_returns_to_list() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/triggers/");
            then.status(200).json_body(json!([{"id": 20, "name": "Guest checks out"}]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/actions/");
            then.status(200).json_body(json!([{"id": 1, "name": "Send Email"}]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/rules/2/");
            then.status(200).json_body(rule_json(
                2,
                "Cleaning Reminder",
                "Guest checks out",
                "scheduled",
                true,
                "2025-04-03T09:00:00Z",
            ));
        })
        .await;
    let put = server
        .mock_async(|when, then| {
            when.method(PUT).path("/api/rules/2/").json_body(json!({
                "name": "Cleaning Reminder",
                "description": "Cleaning Reminder for guests",
                "trigger_id": 20,
                "action_id": 1,
                "rule_type": "scheduled",
                "is_active": true,
                "delay_time": 3,
                "delay_unit": "hours"
            }));
            then.status(200).json_body(rule_json(
                2,
                "Cleaning Reminder",
                "Guest checks out",
                "scheduled",
                true,
                "2025-04-03T09:00:00Z",
            ));
        })
        .await;

    let mut edit = EditScreen::open_with_api(api(&server), "2").await.expect("opened");
    assert_eq!(edit.form().selected_trigger, "20");
    assert_eq!(edit.form().delay_time, "1");
    assert!(edit.take_notices().is_empty());

    edit.form_mut().delay_time = "3".into();
    let outcome = edit.save().await.expect("saved");

    put.assert_async().await;
    assert_eq!(outcome.after_save, AfterSave::NavigateToRuleList);
    assert_eq!(outcome.message, "Workflow \"Cleaning Reminder\" updated successfully!");
}
