pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use crate::cli::Cli;
use crate::commands::AppState;
use crate::config::AppConfig;
use crate::error::AppResult;

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    match try_run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("failed to start: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn try_run(cli: Cli) -> AppResult<bool> {
    let config = AppConfig::load(cli.config.as_deref())?.with_api_base_url(cli.api_url.clone())?;

    crate::utils::logger::init_logging(config.log_dir.as_deref(), cli.verbose)?;
    info!(target: "app::command", api_base_url = %config.api_base_url, "starting");

    let state = AppState::new(config)?;
    Ok(crate::cli::handlers::execute(&state, cli.command, cli.format).await)
}
