use std::sync::Arc;
use std::time::Duration as StdDuration;

use httpmock::prelude::*;
use serde_json::{json, Value};
use suiteop_dashboard_lib::commands::create::{ActiveView, CreateScreen};
use suiteop_dashboard_lib::error::{AppError, ValidationCode};
use suiteop_dashboard_lib::models::form::FormState;
use suiteop_dashboard_lib::models::notice::NoticeLevel;
use suiteop_dashboard_lib::models::rule::{DelayUnit, RuleType};
use suiteop_dashboard_lib::services::api_client::{ApiClient, WorkflowApi};
use suiteop_dashboard_lib::services::rule_submitter::AfterSave;
use suiteop_dashboard_lib::services::suggestion_service::GenerationOutcome;

fn screen(server: &MockServer) -> CreateScreen {
    let api: Arc<dyn WorkflowApi> = Arc::new(
        ApiClient::with_timeout(&server.base_url(), StdDuration::from_secs(2))
            .expect("client builds"),
    );
    CreateScreen::with_api(api)
}

fn preview(name: &str, trigger_id: Value, rule_type: &str) -> Value {
    json!({
        "ai_suggestion": {"workflow_name": name},
        "mapped_suggestion": {
            "workflow_name": name,
            "workflow_description": format!("{name} description"),
            "rule_type": rule_type,
            "delay_time": 30,
            "delay_unit": "minutes",
            "trigger_id": trigger_id,
            "trigger_name": "Guest checks in",
            "action_id": 2,
            "action_name": "Send Email",
            "is_active": true
        },
        "mapping_notes": []
    })
}

fn saved_rule(name: &str) -> Value {
    json!({
        "id": 42,
        "name": name,
        "trigger": {"id": 1, "name": "Guest checks in"},
        "action": {"id": 2, "name": "Send Email"},
        "rule_type": "scheduled",
        "delay_time": 30,
        "delay_unit": "minutes",
        "is_active": true
    })
}

#[tokio::test]
async fn single_suggestion_loads_form_and_switches_view() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/rules/generate-from-ai/");
            then.status(200).json_body(json!({
                "preview_workflows": [preview("Welcome Email", json!(1), "scheduled")]
            }));
        })
        .await;

    let mut create = screen(&server);
    let outcome = create
        .generate("Send a welcome email 30 minutes after check-in")
        .await
        .expect("generation succeeds");

    assert_eq!(outcome, GenerationOutcome::AutoLoaded);
    assert_eq!(create.active_view(), ActiveView::ManualReview);
    assert_eq!(create.session().loaded_index(), Some(0));
    assert!(!create.is_generating());

    let form = create.form();
    assert_eq!(form.workflow_name, "Welcome Email");
    assert_eq!(form.selected_trigger, "1");
    assert_eq!(form.selected_action, "2");
    assert_eq!(form.rule_type, RuleType::Scheduled);
    assert_eq!(form.delay_time, "30");
    assert_eq!(form.delay_unit, DelayUnit::Minutes);

    let notices = create.take_notices();
    assert!(notices
        .iter()
        .any(|notice| notice.level == NoticeLevel::Success && notice.message.contains('1')));
}

#[tokio::test]
async fn multiple_suggestions_require_explicit_selection() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/rules/generate-from-ai/");
            then.status(200).json_body(json!({
                "preview_workflows": [
                    preview("Welcome Email", json!(1), "immediate"),
                    preview("Checkout Survey", json!(null), "scheduled"),
                    {"ai_suggestion": {}, "mapped_suggestion": {}, "mapping_notes": ["nothing matched"]}
                ],
                "ai_reported_errors": [{"details": {"sentence": 3}}]
            }));
        })
        .await;

    let mut create = screen(&server);
    let outcome = create.generate("three ideas please").await.expect("generated");

    assert_eq!(outcome, GenerationOutcome::AwaitingSelection(3));
    assert_eq!(create.form(), &FormState::default());
    assert_eq!(create.active_view(), ActiveView::Prompt);

    let labels: Vec<String> = create
        .session()
        .labels()
        .into_iter()
        .map(|(label, _)| label)
        .collect();
    assert_eq!(labels, vec!["Welcome Email", "Checkout Survey", "Unnamed Workflow"]);

    let notices = create.take_notices();
    assert!(notices
        .iter()
        .any(|notice| notice.level == NoticeLevel::Warning && notice.message.contains("sentence")));

    create.select_suggestion(1).expect("second suggestion");
    assert_eq!(create.form().workflow_name, "Checkout Survey");
    assert_eq!(create.form().selected_trigger, "");
    assert_eq!(create.session().loaded_index(), Some(1));

    let err = create.select_suggestion(7).expect_err("out of range");
    assert_eq!(err.validation_code(), Some(ValidationCode::InvalidSelection));
    assert_eq!(create.session().loaded_index(), Some(1));
    assert_eq!(create.form().workflow_name, "Checkout Survey");

    create.select_suggestion(2).expect("third suggestion");
    assert_eq!(create.mapping_warnings().len(), 1);
}

#[tokio::test]
async fn generation_failure_without_backend_text_reports_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/rules/generate-from-ai/");
            then.status(502).body("bad gateway");
        })
        .await;

    let mut create = screen(&server);
    create.form_mut().workflow_name = "kept".into();

    let err = create.generate("anything").await.expect_err("502");

    assert_eq!(err.to_string(), "AI generation failed (status 502)");
    assert_eq!(create.form().workflow_name, "kept");
    assert!(!create.is_generating());
}

#[tokio::test]
async fn empty_prompt_sends_nothing() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/rules/generate-from-ai/");
            then.status(200).json_body(json!({}));
        })
        .await;

    let mut create = screen(&server);
    assert!(!create.can_generate("   "));
    let err = create.generate("   ").await.expect_err("empty prompt");

    assert_eq!(err.validation_code(), Some(ValidationCode::EmptyPrompt));
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn invalid_delay_is_rejected_without_a_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/rules/");
            then.status(201).json_body(saved_rule("never"));
        })
        .await;

    let mut create = screen(&server);
    {
        let form = create.form_mut();
        form.workflow_name = "Cleaning Reminder".into();
        form.selected_trigger = "1".into();
        form.selected_action = "2".into();
        form.rule_type = RuleType::Scheduled;
    }

    for bad in ["0", "-5", "abc"] {
        create.form_mut().delay_time = bad.into();
        let err = create.save().await.expect_err("invalid delay");
        assert_eq!(err.validation_code(), Some(ValidationCode::InvalidDelay));
    }

    create.form_mut().selected_trigger = String::new();
    let err = create.save().await.expect_err("missing trigger");
    assert_eq!(err.validation_code(), Some(ValidationCode::MissingRequiredField));

    assert_eq!(mock.hits_async().await, 0);
    assert_eq!(create.form().workflow_name, "Cleaning Reminder");
}

#[tokio::test]
async fn successful_create_resets_the_form() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/rules/").json_body(json!({
                "name": "Welcome Email",
                "description": "",
                "trigger_id": 1,
                "action_id": 2,
                "rule_type": "scheduled",
                "is_active": true,
                "delay_time": 30,
                "delay_unit": "minutes"
            }));
            then.status(201).json_body(saved_rule("Welcome Email"));
        })
        .await;

    let mut create = screen(&server);
    {
        let form = create.form_mut();
        form.workflow_name = "Welcome Email".into();
        form.selected_trigger = "1".into();
        form.selected_action = "2".into();
        form.rule_type = RuleType::Scheduled;
        form.delay_time = "30".into();
    }

    let outcome = create.save().await.expect("saved");

    mock.assert_async().await;
    assert_eq!(outcome.after_save, AfterSave::ResetForm);
    assert_eq!(outcome.message, "Workflow \"Welcome Email\" saved successfully!");
    assert_eq!(create.form(), &FormState::default());
}

#[tokio::test]
async fn rejected_create_keeps_the_form() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/rules/");
            then.status(400).json_body(json!({
                "non_field_errors": ["A rule with this trigger and action already exists."]
            }));
        })
        .await;

    let mut create = screen(&server);
    {
        let form = create.form_mut();
        form.workflow_name = "Duplicate".into();
        form.selected_trigger = "1".into();
        form.selected_action = "2".into();
    }
    let before = create.form().clone();

    let err = create.save().await.expect_err("400");

    assert!(matches!(err, AppError::Api { status: 400, .. }));
    assert_eq!(err.to_string(), "A rule with this trigger and action already exists.");
    assert_eq!(create.form(), &before);
}

#[tokio::test]
async fn catalog_failures_are_independent() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/triggers/");
            then.status(200).json_body(json!([{"id": 1, "name": "Guest checks in"}]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/actions/");
            then.status(500);
        })
        .await;

    let mut create = screen(&server);
    create.mount().await;

    assert_eq!(create.catalog().triggers.len(), 1);
    assert!(create.catalog().actions.is_empty());
    let notices = create.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "Failed to load actions.");
}
