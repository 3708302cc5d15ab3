//! Start-up configuration.
//!
//! Values are baked in at build time from `TASKBOARD_API_BASE` and
//! `TASKBOARD_LOG_LEVEL`; a host page can override either with
//! `<meta name="taskboard-api-base" content="…">` and
//! `<meta name="taskboard-log-level" content="…">`.

use thiserror::Error;
use tracing::Level;
use web_sys::window;

pub const DEFAULT_API_BASE: &str = "http://localhost:3000/todolist/api/v1/user";
pub const DEFAULT_LOG_LEVEL: Level = Level::INFO;

const API_BASE_META: &str = "taskboard-api-base";
const LOG_LEVEL_META: &str = "taskboard-log-level";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid log level `{0}`")]
    LogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub log_level: Level,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE.to_string(),
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

impl AppConfig {
    /// Build-time values overridden by the host page. Browser only.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_build_env()?.with_overrides(
            meta_content(API_BASE_META).as_deref(),
            meta_content(LOG_LEVEL_META).as_deref(),
        )
    }

    pub fn from_build_env() -> Result<Self, ConfigError> {
        AppConfig::default().with_overrides(
            option_env!("TASKBOARD_API_BASE"),
            option_env!("TASKBOARD_LOG_LEVEL"),
        )
    }

    /// Blank values are ignored.
    pub fn with_overrides(
        mut self,
        api_base_url: Option<&str>,
        log_level: Option<&str>,
    ) -> Result<Self, ConfigError> {
        if let Some(base) = non_blank(api_base_url) {
            self.api_base_url = base.trim_end_matches('/').to_string();
        }
        if let Some(level) = non_blank(log_level) {
            self.log_level = level
                .parse()
                .map_err(|_| ConfigError::LogLevel(level.to_string()))?;
        }
        Ok(self)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn meta_content(name: &str) -> Option<String> {
    window()?
        .document()?
        .query_selector(&format!("meta[name=\"{}\"]", name))
        .ok()??
        .get_attribute("content")
}
