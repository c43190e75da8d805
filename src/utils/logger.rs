use std::path::Path;

use once_cell::sync::OnceCell;
use tracing_subscriber::{
    fmt, fmt::time::UtcTime, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::error::{AppError, AppResult};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();
static LOGGER_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

const DEFAULT_LOG_DIRECTIVES: &str = "info,app::api=debug";
const VERBOSE_LOG_DIRECTIVES: &str = "debug";
const LOG_FILE_NAME: &str = "suiteop-dashboard.log";

/// Installs the global subscriber once. `RUST_LOG` wins over the defaults;
/// `verbose` lowers the default level to debug. When `log_dir` is set a
/// daily rolling file is written next to the stderr output.
pub fn init_logging(log_dir: Option<&Path>, verbose: bool) -> AppResult<()> {
    LOGGER_INIT
        .get_or_try_init(|| {
            let default_directives = if verbose {
                VERBOSE_LOG_DIRECTIVES
            } else {
                DEFAULT_LOG_DIRECTIVES
            };
            let env_filter = EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_directives))
                .map_err(|err| AppError::config(format!("invalid log directives: {err}")))?;

            let file_layer = match log_dir {
                Some(dir) => {
                    std::fs::create_dir_all(dir)?;
                    let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
                    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                    LOGGER_GUARD
                        .set(guard)
                        .map_err(|_| AppError::other("logging already initialised"))?;
                    Some(
                        fmt::layer()
                            .with_writer(non_blocking)
                            .with_ansi(false)
                            .with_target(true)
                            .with_timer(UtcTime::rfc_3339()),
                    )
                }
                None => None,
            };

            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .with_timer(UtcTime::rfc_3339()),
                )
                .try_init()
                .map_err(|err| AppError::other(format!("failed to install subscriber: {err}")))?;

            Ok::<(), AppError>(())
        })
        .map(|_| ())
}
