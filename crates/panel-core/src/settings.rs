//! Application settings stored in `config.toml`.
//!
//! Every section and field has a default, so a partial or empty file is
//! always valid.

use crate::config::InterviewConfig;
use crate::event::DEFAULT_EVENT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub judge0: Judge0Settings,
    pub llm: LlmSettings,
    pub timeouts: TimeoutSettings,
    pub event_log: EventLogSettings,
    pub reconnect: ReconnectSettings,
    /// Defaults for new interviews.
    pub interview: InterviewConfig,
}

/// Orchestration service endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub ws_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            ws_url: "ws://localhost:8000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl ApiSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Judge0 sandbox (RapidAPI-hosted by default).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Judge0Settings {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub host: String,
    pub poll_interval_ms: u64,
    pub max_polls: u32,
}

impl Default for Judge0Settings {
    fn default() -> Self {
        Self {
            base_url: "https://judge0-ce.p.rapidapi.com".to_string(),
            api_key: None,
            host: "judge0-ce.p.rapidapi.com".to_string(),
            poll_interval_ms: 1000,
            max_polls: 30,
        }
    }
}

/// OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o".to_string(),
            temperature: 0.3,
        }
    }
}

/// Deadlines for external assessment calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    pub analysis_secs: u64,
    pub execution_secs: u64,
    pub scoring_secs: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            analysis_secs: 20,
            execution_secs: 60,
            scoring_secs: 60,
        }
    }
}

impl TimeoutSettings {
    pub fn analysis(&self) -> Duration {
        Duration::from_secs(self.analysis_secs)
    }

    pub fn execution(&self) -> Duration {
        Duration::from_secs(self.execution_secs)
    }

    pub fn scoring(&self) -> Duration {
        Duration::from_secs(self.scoring_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventLogSettings {
    pub capacity: usize,
}

impl Default for EventLogSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Exponential backoff for the session channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectSettings {
    pub initial_delay_ms: u64,
    pub multiplier: u32,
    pub max_delay_ms: u64,
    pub max_attempts: u32,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            initial_delay_ms: 500,
            multiplier: 2,
            max_delay_ms: 10_000,
            max_attempts: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.timeouts.analysis(), Duration::from_secs(20));
        assert_eq!(config.event_log.capacity, 10_000);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [api]
            base_url = "http://interview.internal:9000"

            [reconnect]
            max_attempts = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "http://interview.internal:9000");
        assert_eq!(config.api.ws_url, "ws://localhost:8000");
        assert_eq!(config.reconnect.max_attempts, 8);
        assert_eq!(config.reconnect.initial_delay_ms, 500);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = AppConfig::default();
        config.judge0.api_key = Some("secret".to_string());
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
