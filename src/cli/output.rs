use comfy_table::{Cell, Table};
use serde::Serialize;
use serde_json::json;

use crate::commands::{CommandError, CommandResult};
use crate::models::catalog::CatalogItem;
use crate::models::execution_log::ExecutionLog;
use crate::models::notice::{Notice, NoticeLevel};
use crate::models::rule::WorkflowRule;
use crate::models::suggestion::PreviewWorkflow;
use crate::utils::format::format_timestamp;

use super::OutputFormat;

pub fn print_json<T: Serialize>(value: &T) -> CommandResult<()> {
    let output = serde_json::to_string_pretty(value)
        .map_err(|err| CommandError::new("UNKNOWN", format!("failed to encode output: {err}"), None))?;
    println!("{output}");
    Ok(())
}

pub fn print_table(table: Table) {
    println!("{table}");
}

/// Prints notices to stderr in text mode. In JSON mode they travel with
/// the result instead.
pub fn print_notices(notices: &[Notice], format: OutputFormat, skip_errors: bool) {
    if format.is_json() {
        return;
    }
    for notice in notices {
        if skip_errors && notice.level == NoticeLevel::Error {
            continue;
        }
        let prefix = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        eprintln!("[{prefix}] {}", notice.message);
    }
}

/// JSON envelope: `{ "result": ..., "notices": [...] }`.
pub fn print_result<T: Serialize>(result: &T, notices: &[Notice]) -> CommandResult<()> {
    print_json(&json!({ "result": result, "notices": notices }))
}

pub fn print_error(error: &CommandError, format: OutputFormat) {
    if format.is_json() {
        if let Ok(output) = serde_json::to_string_pretty(&json!({ "error": error })) {
            println!("{output}");
        }
    } else {
        eprintln!("error: {}", error.message);
    }
}

pub fn catalog_table(items: &[CatalogItem]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Description"]);
    for item in items {
        table.add_row(vec![
            Cell::new(item.id.to_string()),
            Cell::new(&item.name),
            Cell::new(item.description.as_deref().unwrap_or("")),
        ]);
    }
    table
}

pub fn rules_table<'a>(rules: impl IntoIterator<Item = &'a WorkflowRule>) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Trigger", "Action", "Type", "Active", "Created"]);
    for rule in rules {
        table.add_row(vec![
            Cell::new(rule.id.to_string()),
            Cell::new(&rule.name),
            Cell::new(&rule.trigger.name),
            Cell::new(&rule.action.name),
            Cell::new(rule.schedule_label()),
            Cell::new(if rule.is_active { "yes" } else { "no" }),
            Cell::new(format_timestamp(rule.created_at.as_deref())),
        ]);
    }
    table
}

pub fn rule_detail(rule: &WorkflowRule) -> Table {
    let mut table = Table::new();
    let rows = [
        ("ID", rule.id.to_string()),
        ("Name", rule.name.clone()),
        ("Description", rule.description.clone().unwrap_or_default()),
        ("Trigger", format!("{} ({})", rule.trigger.name, rule.trigger.id)),
        ("Action", format!("{} ({})", rule.action.name, rule.action.id)),
        ("Type", rule.schedule_label()),
        ("Active", if rule.is_active { "yes" } else { "no" }.to_string()),
        ("Created", format_timestamp(rule.created_at.as_deref())),
        ("Updated", format_timestamp(rule.updated_at.as_deref())),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    table
}

pub fn logs_table(logs: &[ExecutionLog]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Logged", "Workflow", "Trigger", "Action", "Status", "Scheduled", "Executed", "Details",
    ]);
    for log in logs {
        table.add_row(vec![
            Cell::new(format_timestamp(Some(&log.logged_at))),
            Cell::new(&log.workflow_rule.name),
            Cell::new(&log.trigger_name_snapshot),
            Cell::new(&log.action_name_snapshot),
            Cell::new(&log.status),
            Cell::new(format_timestamp(log.scheduled_execution_time.as_deref())),
            Cell::new(format_timestamp(log.actual_execution_time.as_deref())),
            Cell::new(log.details.as_deref().unwrap_or("")),
        ]);
    }
    table
}

pub fn suggestions_table(previews: &[PreviewWorkflow], loaded: Option<usize>) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Workflow", "Trigger", "Action", "Type", "Loaded"]);
    for (index, preview) in previews.iter().enumerate() {
        let mapped = &preview.mapped_suggestion;
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(preview.label()),
            Cell::new(mapped.trigger_name.as_deref().unwrap_or("(unmatched)")),
            Cell::new(mapped.action_name.as_deref().unwrap_or("(unmatched)")),
            Cell::new(mapped.rule_type.unwrap_or_default().label()),
            Cell::new(if loaded == Some(index) { "*" } else { "" }),
        ]);
    }
    table
}
