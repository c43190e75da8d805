use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    suiteop_dashboard_lib::run().await
}
