use crate::error::{PanelError, Result};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Longest interview accepted, in minutes.
pub const MAX_DURATION_MINUTES: u32 = 480;

#[derive(
    Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

/// Per-session interview parameters.
///
/// Supplied when the session starts and never mutated afterwards. Field
/// names serialize in snake_case, matching the orchestration API. Missing
/// fields take their defaults.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct InterviewConfig {
    pub role: String,
    pub difficulty: Difficulty,
    pub languages_allowed: Vec<String>,
    pub duration_minutes: u32,
    pub realtime_hints: bool,
    pub voice: String,
    pub rubric_id: String,
    pub video_avatar: String,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            role: "Backend Software Engineer".to_string(),
            difficulty: Difficulty::Medium,
            languages_allowed: vec!["python".to_string(), "java".to_string(), "cpp".to_string()],
            duration_minutes: 45,
            realtime_hints: false,
            voice: "en-US-Neural2-D".to_string(),
            rubric_id: "backend_v3".to_string(),
            video_avatar: "RobotRecruiter.glb".to_string(),
        }
    }
}

impl InterviewConfig {
    /// Rejects configurations no session could run with.
    pub fn validate(&self) -> Result<()> {
        if self.role.trim().is_empty() {
            return Err(PanelError::validation("role must not be empty"));
        }
        if self.languages_allowed.is_empty() {
            return Err(PanelError::validation(
                "at least one programming language must be allowed",
            ));
        }
        if self.languages_allowed.iter().any(|l| l.trim().is_empty()) {
            return Err(PanelError::validation("language names must not be empty"));
        }
        if self.duration_minutes == 0 || self.duration_minutes > MAX_DURATION_MINUTES {
            return Err(PanelError::validation(format!(
                "duration must be between 1 and {MAX_DURATION_MINUTES} minutes, got {}",
                self.duration_minutes
            )));
        }
        Ok(())
    }

    /// Whether `language` is one of the allowed languages (case-insensitive).
    pub fn allows_language(&self, language: &str) -> bool {
        self.languages_allowed
            .iter()
            .any(|l| l.eq_ignore_ascii_case(language))
    }

    /// Planned duration in seconds.
    pub fn planned_secs(&self) -> u64 {
        self.duration_minutes as u64 * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = InterviewConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.planned_secs(), 45 * 60);
    }

    #[test]
    fn test_validation_failures() {
        let mut config = InterviewConfig::default();
        config.role = "  ".into();
        assert!(config.validate().unwrap_err().is_validation());

        let mut config = InterviewConfig::default();
        config.languages_allowed.clear();
        assert!(config.validate().is_err());

        let mut config = InterviewConfig::default();
        config.duration_minutes = 0;
        assert!(config.validate().is_err());

        let mut config = InterviewConfig::default();
        config.duration_minutes = MAX_DURATION_MINUTES + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_allows_language_ignores_case() {
        let config = InterviewConfig::default();
        assert!(config.allows_language("Python"));
        assert!(!config.allows_language("rust"));
    }

    #[test]
    fn test_wire_format_is_snake_case() {
        let json = serde_json::to_value(InterviewConfig::default()).unwrap();
        assert_eq!(json["difficulty"], "medium");
        assert_eq!(json["duration_minutes"], 45);
        assert_eq!(json["languages_allowed"][2], "cpp");
        assert_eq!(json["video_avatar"], "RobotRecruiter.glb");
    }

    #[test]
    fn test_realtime_hints_defaults_when_missing() {
        let toml_src = r#"
            role = "SRE"
            difficulty = "hard"
            languages_allowed = ["go"]
            duration_minutes = 30
            voice = "en-GB"
            rubric_id = "sre_v1"
            video_avatar = "Bot.glb"
        "#;
        let config: InterviewConfig = toml::from_str(toml_src).unwrap();
        assert!(!config.realtime_hints);
        assert_eq!(config.difficulty, Difficulty::Hard);
    }
}
