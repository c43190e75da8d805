use tracing::info;

use crate::error::AppResult;
use crate::models::catalog::CatalogItem;
use crate::models::notice::Notice;
use crate::models::simulation::SimulationResult;
use crate::models::suggestion::describe_soft_error;
use crate::services::api_client::WorkflowApi;

/// Builds the success line shown after a simulation, e.g.
/// `Trigger "Guest checks in" simulated. 2 log(s) created.`
pub fn summarize(trigger_name: &str, result: &SimulationResult) -> String {
    let mut message = format!("Trigger \"{trigger_name}\" simulated.");

    let logs_created = result
        .simulated_logs_created
        .as_ref()
        .map(Vec::len)
        .unwrap_or(0);

    if logs_created > 0 {
        message.push_str(&format!(" {logs_created} log(s) created."));
    } else {
        match result.rules_processed_count {
            Some(0) => message.push_str(" No active rules found for this trigger."),
            Some(count) => message.push_str(&format!(" Processed {count} rule(s).")),
            None => {}
        }
    }
    message
}

/// One warning per issue the backend reported while simulating.
pub fn issue_notices(result: &SimulationResult) -> Vec<Notice> {
    result
        .simulation_errors
        .iter()
        .flatten()
        .map(|issue| {
            let detail = issue
                .get("details")
                .map(|details| match details.as_str() {
                    Some(text) => text.to_string(),
                    None => details.to_string(),
                })
                .unwrap_or_else(|| describe_soft_error(issue));
            Notice::warning(format!("Simulation issue: {detail}"))
        })
        .collect()
}

/// Fires `trigger` on the backend and returns the notices to show.
pub async fn simulate(api: &dyn WorkflowApi, trigger: &CatalogItem) -> AppResult<(SimulationResult, Vec<Notice>)> {
    let result = api.simulate_trigger(&trigger.id).await?;
    info!(
        target: "app::simulator",
        trigger_id = %trigger.id,
        logs_created = result.simulated_logs_created.as_ref().map(Vec::len).unwrap_or(0),
        issues = result.simulation_errors.as_ref().map(Vec::len).unwrap_or(0),
        "trigger simulated"
    );

    let mut notices = vec![Notice::success(summarize(&trigger.name, &result))];
    notices.extend(issue_notices(&result));
    Ok((result, notices))
}
