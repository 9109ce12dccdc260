use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

use crate::error::ConfigError;
use crate::i18n::Language;

pub const DEFAULT_CONFIG_FILE: &str = "lisa.toml";

/// Sitting threshold. Only these values are offered to the user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(try_from = "u32", into = "u32")]
pub enum TimeLimit {
    TenSeconds,
    #[default]
    ThirtySeconds,
    TwentyMinutes,
}

impl TimeLimit {
    pub const ALL: [TimeLimit; 3] = [
        TimeLimit::TenSeconds,
        TimeLimit::ThirtySeconds,
        TimeLimit::TwentyMinutes,
    ];

    pub fn seconds(&self) -> u64 {
        match self {
            TimeLimit::TenSeconds => 10,
            TimeLimit::ThirtySeconds => 30,
            TimeLimit::TwentyMinutes => 1200,
        }
    }

    pub fn millis(&self) -> u64 {
        self.seconds() * 1000
    }
}

impl TryFrom<u32> for TimeLimit {
    type Error = ConfigError;

    fn try_from(seconds: u32) -> Result<Self, Self::Error> {
        TimeLimit::ALL
            .into_iter()
            .find(|limit| limit.seconds() == seconds as u64)
            .ok_or(ConfigError::UnsupportedTimeLimit(seconds))
    }
}

impl From<TimeLimit> for u32 {
    fn from(limit: TimeLimit) -> Self {
        limit.seconds() as u32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Configuration {
    pub listen_addr: String,
    pub alert_endpoint: String,
    pub user_id: String,
    pub time_limit: TimeLimit,
    pub language: Language,
    pub notifications_granted: bool,
    pub command_buffer_size: usize,
    pub status_buffer_size: usize,
    pub request_timeout_secs: Option<u64>,
    pub log_level: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:3344".to_string(),
            alert_endpoint: "http://127.0.0.1:8081".to_string(),
            user_id: "user_001".to_string(),
            time_limit: TimeLimit::default(),
            language: Language::default(),
            notifications_granted: true,
            command_buffer_size: 60,
            status_buffer_size: 10,
            request_timeout_secs: None,
            log_level: "info".to_string(),
        }
    }
}

impl Configuration {
    /// Layers `LISA_*` environment variables over an optional TOML file.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(
                config::File::with_name(path.unwrap_or(DEFAULT_CONFIG_FILE)).required(path.is_some()),
            )
            .add_source(config::Environment::with_prefix("LISA"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn log_level(&self) -> Result<Level, ConfigError> {
        parse_log_level(&self.log_level)
    }
}

/// Settings for the `lisa-backend` binary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendConfiguration {
    pub bind_addr: String,
    pub llm_url: String,
    pub llm_model: String,
    pub llm_api_key: Option<String>,
    pub llm_timeout_secs: u64,
    pub log_level: String,
}

impl Default for BackendConfiguration {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8081".to_string(),
            llm_url: "https://api.deepseek.com/chat/completions".to_string(),
            llm_model: "deepseek-chat".to_string(),
            llm_api_key: None,
            llm_timeout_secs: 10,
            log_level: "info".to_string(),
        }
    }
}

impl BackendConfiguration {
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("LISA_BACKEND"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn log_level(&self) -> Result<Level, ConfigError> {
        parse_log_level(&self.log_level)
    }
}

fn parse_log_level(level: &str) -> Result<Level, ConfigError> {
    Level::from_str(level).map_err(|_| ConfigError::InvalidLogLevel(level.to_string()))
}
