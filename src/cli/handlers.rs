use std::io::{self, BufRead, Write};

use serde_json::json;
use tracing::debug;

use crate::commands::create::CreateScreen;
use crate::commands::edit::EditScreen;
use crate::commands::logs::LogsScreen;
use crate::commands::rules::RulesScreen;
use crate::commands::simulator::SimulatorScreen;
use crate::commands::{AppState, CommandError, CommandResult};
use crate::error::{AppError, AppResult, ValidationCode};
use crate::models::catalog::{CatalogId, CatalogItem};
use crate::models::form::FormState;
use crate::models::notice::Notice;
use crate::services::catalog_service::Catalog;
use crate::services::log_viewer::{LogSnapshot, STALE_DATA_NOTICE};
use crate::services::rule_list::RuleFilter;
use crate::services::suggestion_service::GenerationOutcome;

use super::output::{
    catalog_table, logs_table, print_error, print_json, print_notices, print_result, print_table,
    rule_detail, rules_table, suggestions_table,
};
use super::{Commands, GenerateArgs, OutputFormat, RuleCommands, RuleFilterArgs, RuleFormArgs};

pub async fn dispatch(state: &AppState, command: Commands, format: OutputFormat) -> CommandResult<()> {
    debug!(target: "app::command", ?command, "dispatching command");
    match command {
        Commands::Triggers => list_catalog(state, format, true).await,
        Commands::Actions => list_catalog(state, format, false).await,
        Commands::Rules { command } => run_rules(state, command, format).await,
        Commands::Generate(args) => generate(state, args, format).await,
        Commands::Logs { follow } => logs(state, follow, format).await,
        Commands::Simulate { trigger_id } => simulate(state, &trigger_id, format).await,
        Commands::Stats { recent } => stats(state, recent, format).await,
    }
}

/// Prints the notices a screen raised and converts the outcome. When the
/// command failed, error notices are left to the top-level error report.
fn finish<T>(result: AppResult<T>, notices: &[Notice], format: OutputFormat) -> CommandResult<T> {
    print_notices(notices, format, result.is_err());
    result.map_err(CommandError::from)
}

async fn list_catalog(state: &AppState, format: OutputFormat, triggers: bool) -> CommandResult<()> {
    let api = state.api();
    let items: Vec<CatalogItem> = if triggers {
        api.list_triggers().await?
    } else {
        api.list_actions().await?
    };

    if format.is_json() {
        return print_result(&items, &[]);
    }
    if items.is_empty() {
        println!("No {} found", if triggers { "triggers" } else { "actions" });
        return Ok(());
    }
    print_table(catalog_table(&items));
    Ok(())
}

async fn run_rules(state: &AppState, command: RuleCommands, format: OutputFormat) -> CommandResult<()> {
    match command {
        RuleCommands::List(filter) => list_rules(state, filter, format).await,
        RuleCommands::Show { id } => show_rule(state, &id, format).await,
        RuleCommands::Toggle { id, active } => toggle_rule(state, &id, active, format).await,
        RuleCommands::Delete { id, yes } => delete_rule(state, &id, yes, format).await,
        RuleCommands::Create(form) => create_rule(state, form, format).await,
        RuleCommands::Edit { id, form } => edit_rule(state, &id, form, format).await,
    }
}

fn build_filter(args: RuleFilterArgs) -> AppResult<RuleFilter> {
    Ok(RuleFilter {
        search_term: args.search.unwrap_or_default(),
        filter_active: args.active,
        filter_type: args.rule_type.as_deref().unwrap_or("all").parse()?,
        filter_trigger: args.trigger,
    })
}

async fn list_rules(state: &AppState, args: RuleFilterArgs, format: OutputFormat) -> CommandResult<()> {
    let filter = build_filter(args)?;
    let mut screen = RulesScreen::new(state);
    let loaded = screen.mount().await;
    let notices = screen.take_notices();
    finish(loaded, &notices, format)?;

    screen.set_filter(filter);
    let visible = screen.visible();

    if format.is_json() {
        return print_result(&visible, &notices);
    }
    if visible.is_empty() {
        if screen.list().is_empty() {
            println!("No workflows yet. Create one with `rules create` or `generate`.");
        } else {
            println!("No workflows match the current filters");
        }
        return Ok(());
    }
    print_table(rules_table(visible));
    Ok(())
}

async fn show_rule(state: &AppState, id: &str, format: OutputFormat) -> CommandResult<()> {
    let rule = state.api().get_rule(&CatalogId::from(id.trim())).await?;
    if format.is_json() {
        return print_result(&rule, &[]);
    }
    print_table(rule_detail(&rule));
    Ok(())
}

async fn toggle_rule(
    state: &AppState,
    id: &str,
    active: Option<bool>,
    format: OutputFormat,
) -> CommandResult<()> {
    let mut screen = RulesScreen::new(state);
    let loaded = screen.mount().await;
    finish(loaded, &screen.take_notices(), format)?;

    let current = screen
        .list()
        .find(id)
        .map(|rule| rule.is_active)
        .ok_or_else(AppError::not_found)?;
    let desired = active.unwrap_or(!current);

    let result = screen.toggle(id, desired).await;
    let notices = screen.take_notices();
    finish(result, &notices, format)?;

    if format.is_json() {
        return print_result(&screen.list().find(id), &notices);
    }
    Ok(())
}

async fn delete_rule(state: &AppState, id: &str, yes: bool, format: OutputFormat) -> CommandResult<()> {
    let mut screen = RulesScreen::new(state);
    let loaded = screen.mount().await;
    finish(loaded, &screen.take_notices(), format)?;

    let prompt = screen.request_delete(id)?;
    if !yes && !confirm(&prompt)? {
        screen.cancel_delete();
        if format.is_json() {
            return print_result(&json!({ "id": id, "deleted": false }), &[]);
        }
        println!("Delete cancelled");
        return Ok(());
    }

    let result = screen.confirm_delete().await;
    let notices = screen.take_notices();
    let removed = finish(result, &notices, format)?;

    if format.is_json() {
        return print_result(&json!({ "id": removed.id, "deleted": true }), &notices);
    }
    Ok(())
}

fn confirm(prompt: &str) -> CommandResult<bool> {
    eprint!("{prompt} [y/N] ");
    io::stderr().flush().map_err(AppError::from)?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(AppError::from)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Id string bound to the form for a trigger or action given as an id or
/// an exact name. Unknown values pass through unchanged and are rejected
/// by the submitter.
fn resolve_catalog_value(found: Option<&CatalogItem>, value: &str) -> String {
    found
        .map(|item| item.id.as_form_value())
        .unwrap_or_else(|| value.trim().to_string())
}

fn apply_form_args(form: &mut FormState, args: RuleFormArgs, catalog: &Catalog) -> AppResult<()> {
    if let Some(name) = args.name {
        form.workflow_name = name;
    }
    if let Some(description) = args.description {
        form.workflow_description = description;
    }
    if let Some(trigger) = args.trigger {
        let found = catalog.trigger(&trigger).or_else(|| catalog.trigger_by_name(&trigger));
        form.selected_trigger = resolve_catalog_value(found, &trigger);
    }
    if let Some(action) = args.action {
        let found = catalog.action(&action).or_else(|| catalog.action_by_name(&action));
        form.selected_action = resolve_catalog_value(found, &action);
    }
    if let Some(rule_type) = args.rule_type {
        form.rule_type = rule_type
            .parse()
            .map_err(|message: String| AppError::validation(ValidationCode::InvalidValue, message))?;
    }
    if let Some(delay) = args.delay {
        form.delay_time = delay;
    }
    if let Some(unit) = args.unit {
        form.delay_unit = unit
            .parse()
            .map_err(|message: String| AppError::validation(ValidationCode::InvalidValue, message))?;
    }
    if let Some(active) = args.active {
        form.is_active = active;
    }
    Ok(())
}

async fn create_rule(state: &AppState, args: RuleFormArgs, format: OutputFormat) -> CommandResult<()> {
    let mut screen = CreateScreen::new(state);
    screen.mount().await;

    let catalog = screen.catalog().clone();
    if let Err(err) = apply_form_args(screen.form_mut(), args, &catalog) {
        return finish(Err(err), &screen.take_notices(), format);
    }

    let result = screen.save().await;
    let notices = screen.take_notices();
    let outcome = finish(result, &notices, format)?;

    if format.is_json() {
        return print_result(&outcome.rule, &notices);
    }
    print_table(rule_detail(&outcome.rule));
    Ok(())
}

async fn edit_rule(
    state: &AppState,
    id: &str,
    args: RuleFormArgs,
    format: OutputFormat,
) -> CommandResult<()> {
    let mut screen = EditScreen::open(state, id).await?;

    let catalog = screen.catalog().clone();
    if let Err(err) = apply_form_args(screen.form_mut(), args, &catalog) {
        return finish(Err(err), &screen.take_notices(), format);
    }

    let result = screen.save().await;
    let notices = screen.take_notices();
    let outcome = finish(result, &notices, format)?;

    if format.is_json() {
        return print_result(&outcome.rule, &notices);
    }
    print_table(rule_detail(&outcome.rule));
    Ok(())
}

/// Converts a 1-based `--select` number into a suggestion index.
fn suggestion_index(number: usize) -> AppResult<usize> {
    number.checked_sub(1).ok_or_else(|| {
        AppError::validation(
            ValidationCode::InvalidSelection,
            "Suggestion numbers start at 1",
        )
    })
}

async fn generate(state: &AppState, args: GenerateArgs, format: OutputFormat) -> CommandResult<()> {
    let mut screen = CreateScreen::new(state);

    let generated = screen.generate(&args.prompt).await;
    let mut notices = screen.take_notices();
    let outcome = finish(generated, &notices, format)?;

    if let Some(number) = args.select {
        let selected = match suggestion_index(number) {
            Ok(index) => screen.select_suggestion(index),
            Err(err) => Err(err),
        };
        let selection_notices = screen.take_notices();
        finish(selected, &selection_notices, format)?;
        notices.extend(selection_notices);
    }

    let mapping_warnings = screen.mapping_warnings();
    if !format.is_json() {
        if let GenerationOutcome::Created(rules) = &outcome {
            print_table(rules_table(rules));
        }
        if !screen.session().previews().is_empty() {
            print_table(suggestions_table(
                screen.session().previews(),
                screen.session().loaded_index(),
            ));
        }
        finish(Ok(()), &mapping_warnings, format)?;
    }
    notices.extend(mapping_warnings);

    let mut saved = None;
    if args.save {
        if screen.session().loaded_index().is_none() {
            let err = AppError::validation(
                ValidationCode::InvalidSelection,
                "No suggestion is loaded; pass --select N to choose one before saving",
            );
            return Err(err.into());
        }
        let result = screen.save().await;
        let save_notices = screen.take_notices();
        let outcome = finish(result, &save_notices, format)?;
        notices.extend(save_notices);
        saved = Some(outcome.rule);
    }

    if format.is_json() {
        return print_result(
            &json!({
                "suggestions": screen.session().previews(),
                "loadedIndex": screen.session().loaded_index(),
                "globalErrors": screen.session().global_errors(),
                "form": screen.form(),
                "saved": saved,
            }),
            &notices,
        );
    }
    Ok(())
}

async fn logs(state: &AppState, follow: bool, format: OutputFormat) -> CommandResult<()> {
    let mut screen = LogsScreen::new(state);

    if !follow {
        let result = screen.refresh().await;
        let notices = screen.take_notices();
        let snapshot = finish(result, &notices, format)?;
        return render_logs(&snapshot, format);
    }

    let poller = screen.start_polling();
    let mut updates = poller.subscribe();
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if let Some(error) = &snapshot.inline_error {
                    eprintln!("[error] {error}");
                    continue;
                }
                if snapshot.stale {
                    eprintln!("[warning] {STALE_DATA_NOTICE}");
                }
                render_logs(&snapshot, format)?;
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }
    poller.stop().await?;
    Ok(())
}

fn render_logs(snapshot: &LogSnapshot, format: OutputFormat) -> CommandResult<()> {
    if format.is_json() {
        return print_json(&json!({
            "logs": snapshot.logs,
            "stale": snapshot.stale,
            "refreshedAt": snapshot.refreshed_at,
        }));
    }
    if snapshot.logs.is_empty() {
        println!("No execution logs yet");
        return Ok(());
    }
    print_table(logs_table(&snapshot.logs));
    Ok(())
}

async fn simulate(state: &AppState, trigger_id: &str, format: OutputFormat) -> CommandResult<()> {
    let mut screen = SimulatorScreen::new(state);
    let mounted = screen.mount().await;
    finish(mounted, &screen.take_notices(), format)?;

    let result = screen.simulate(trigger_id).await;
    let notices = screen.take_notices();
    let result = finish(result, &notices, format)?;

    if format.is_json() {
        return print_result(&result, &notices);
    }
    Ok(())
}

async fn stats(state: &AppState, recent: usize, format: OutputFormat) -> CommandResult<()> {
    let mut screen = RulesScreen::new(state);
    let loaded = screen.mount().await;
    finish(loaded, &screen.take_notices(), format)?;

    let stats = screen.stats();
    let recent_rules = screen.recent(recent);

    if format.is_json() {
        return print_result(&json!({ "stats": stats, "recent": recent_rules }), &[]);
    }

    println!("Total workflows:          {}", stats.total);
    println!("Active immediate actions: {}", stats.active_immediate);
    println!("Active scheduled actions: {}", stats.active_scheduled);
    if !recent_rules.is_empty() {
        println!();
        print_table(rules_table(recent_rules));
    }
    Ok(())
}

/// Runs one parsed command and reports a failure in the chosen format.
/// Returns whether the command succeeded.
pub async fn execute(state: &AppState, command: Commands, format: OutputFormat) -> bool {
    match dispatch(state, command, format).await {
        Ok(()) => true,
        Err(error) => {
            print_error(&error, format);
            false
        }
    }
}
