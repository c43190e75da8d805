use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, AppResult};

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

const ENV_API_URL: &str = "SUITEOP_API_URL";
const ENV_HTTP_TIMEOUT: &str = "SUITEOP_HTTP_TIMEOUT_SECS";
const ENV_POLL_INTERVAL: &str = "SUITEOP_POLL_INTERVAL_SECS";
const ENV_LOG_DIR: &str = "SUITEOP_LOG_DIR";

const CONFIG_DIR_NAME: &str = "suiteop-dashboard";
const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub http_timeout: Duration,
    pub poll_interval: Duration,
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            log_dir: None,
        }
    }
}

/// On-disk shape of `config.yaml`. Every key is optional.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub api_base_url: Option<String>,
    pub http_timeout_secs: Option<u64>,
    pub poll_interval_secs: Option<u64>,
    pub log_dir: Option<PathBuf>,
}

impl ConfigFile {
    pub fn read(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw)
            .map_err(|err| AppError::config(format!("invalid config file {}: {err}", path.display())))
    }
}

impl AppConfig {
    /// Defaults, then the YAML file, then the process environment.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    pub fn load_with_env(
        path: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        let mut config = Self::default();

        let file = match path {
            Some(path) => Some(ConfigFile::read(path)?),
            None => match default_config_path() {
                Some(default_path) if default_path.is_file() => {
                    Some(ConfigFile::read(&default_path)?)
                }
                _ => None,
            },
        };

        if let Some(file) = file {
            config.apply_file(file);
        }
        config.apply_env(lookup)?;
        config.normalize()?;

        debug!(
            target: "app::config",
            api_base_url = %config.api_base_url,
            http_timeout_secs = config.http_timeout.as_secs(),
            poll_interval_secs = config.poll_interval.as_secs(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Applies a base URL given on the command line.
    pub fn with_api_base_url(mut self, api_base_url: Option<String>) -> AppResult<Self> {
        if let Some(url) = api_base_url {
            self.api_base_url = url;
            self.normalize()?;
        }
        Ok(self)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(url) = file.api_base_url {
            self.api_base_url = url;
        }
        if let Some(secs) = file.http_timeout_secs {
            self.http_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.poll_interval_secs {
            self.poll_interval = Duration::from_secs(secs);
        }
        if let Some(dir) = file.log_dir {
            self.log_dir = Some(dir);
        }
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> AppResult<()> {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(raw) = lookup(ENV_HTTP_TIMEOUT) {
            self.http_timeout = Duration::from_secs(parse_secs(ENV_HTTP_TIMEOUT, &raw)?);
        }
        if let Some(raw) = lookup(ENV_POLL_INTERVAL) {
            self.poll_interval = Duration::from_secs(parse_secs(ENV_POLL_INTERVAL, &raw)?);
        }
        if let Some(dir) = lookup(ENV_LOG_DIR).filter(|value| !value.trim().is_empty()) {
            self.log_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    fn normalize(&mut self) -> AppResult<()> {
        let trimmed = self.api_base_url.trim().trim_end_matches('/').to_string();
        if trimmed.is_empty() {
            return Err(AppError::config("API base URL must not be empty"));
        }
        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(AppError::config(format!(
                "API base URL must start with http:// or https:// (got '{trimmed}')"
            )));
        }
        self.api_base_url = trimmed;

        if self.http_timeout.is_zero() {
            return Err(AppError::config("HTTP timeout must be at least one second"));
        }
        if self.poll_interval.is_zero() {
            return Err(AppError::config("poll interval must be at least one second"));
        }
        Ok(())
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn parse_secs(key: &str, raw: &str) -> AppResult<u64> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::config(format!("{key} must be a whole number of seconds (got '{raw}')")))
}
