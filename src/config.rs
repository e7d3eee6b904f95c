// Deep-Research: Configuration
// Defaults, optional settings file, and credentials from the process environment

use crate::error::{ResearchError, Result};
use crate::llm::ProviderType;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tavily::SearchDepth;

pub const GEMINI_KEY_VAR: &str = "GEMINI_API_KEY";
pub const TAVILY_KEY_VAR: &str = "TAVILY_API_KEY";

pub const MODEL_LITE: &str = "gemini-2.5-flash-lite";
pub const MODEL: &str = "gemini-2.5-flash";

pub const DEFAULT_USER_NAME: &str = "Mehdi";
pub const DEFAULT_MAX_RESULTS: u32 = 1;
pub const MAX_QUESTIONS: u32 = 3;
pub const MAX_ORCHESTRATOR_ROUNDS: usize = 20;
pub const MAX_SEARCH_ROUNDS: usize = 10;
pub const RESEARCHES_DIR: &str = "researches";

/// Runtime settings for one research run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub user_name: String,
    pub max_results: u32,
    pub search_depth: SearchDepth,
    pub max_questions: u32,
    pub max_orchestrator_rounds: usize,
    pub max_search_rounds: usize,
    pub researches_dir: PathBuf,
    pub session_dir: PathBuf,
    pub provider: ProviderType,
    pub base_url: Option<String>,
    pub lite_model: String,
    pub full_model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_name: DEFAULT_USER_NAME.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            search_depth: SearchDepth::Basic,
            max_questions: MAX_QUESTIONS,
            max_orchestrator_rounds: MAX_ORCHESTRATOR_ROUNDS,
            max_search_rounds: MAX_SEARCH_ROUNDS,
            researches_dir: PathBuf::from(RESEARCHES_DIR),
            session_dir: default_session_dir(),
            provider: ProviderType::Gemini,
            base_url: None,
            lite_model: MODEL_LITE.to_string(),
            full_model: MODEL.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the user config dir, falling back to defaults
    pub fn load() -> Result<Self> {
        let path = settings_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            log::debug!("No settings file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ResearchError::Config(format!("Failed to read settings: {}", e)))?;
        let settings: Settings = serde_json::from_str(&json)
            .map_err(|e| ResearchError::Config(format!("Failed to parse settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ResearchError::Config(format!("Failed to create config dir: {}", e)))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ResearchError::Config(format!("Failed to serialize settings: {}", e)))?;
        std::fs::write(path, json)
            .map_err(|e| ResearchError::Config(format!("Failed to write settings: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_results < 1 {
            return Err(ResearchError::Config("max_results must be at least 1".to_string()));
        }
        if self.max_questions < 1 || self.max_questions > MAX_QUESTIONS {
            return Err(ResearchError::Config(format!(
                "max_questions must be between 1 and {}",
                MAX_QUESTIONS
            )));
        }
        if self.max_orchestrator_rounds < 1 || self.max_search_rounds < 1 {
            return Err(ResearchError::Config("round limits must be at least 1".to_string()));
        }
        Ok(())
    }
}

pub fn settings_path() -> PathBuf {
    let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config_dir.join("deep-research").join("settings.json")
}

fn default_session_dir() -> PathBuf {
    let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    data_dir.join("deep-research").join("sessions")
}

/// API keys the pipeline cannot run without
#[derive(Clone)]
pub struct Credentials {
    pub model_api_key: String,
    pub search_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("model_api_key", &"***")
            .field("search_api_key", &"***")
            .finish()
    }
}

impl Credentials {
    /// Read both keys from the environment (after `.env` was loaded)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let model_api_key = read(GEMINI_KEY_VAR);
        let search_api_key = read(TAVILY_KEY_VAR);

        match (model_api_key, search_api_key) {
            (Some(model_api_key), Some(search_api_key)) => Ok(Self {
                model_api_key,
                search_api_key,
            }),
            (model, search) => {
                let mut missing = Vec::new();
                if model.is_none() {
                    missing.push(GEMINI_KEY_VAR);
                }
                if search.is_none() {
                    missing.push(TAVILY_KEY_VAR);
                }
                Err(ResearchError::Config(format!(
                    "Please set {} in your environment or .env file",
                    missing.join(" and ")
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_are_named() {
        let err = Credentials::from_lookup(|name| {
            (name == GEMINI_KEY_VAR).then(|| "key".to_string())
        })
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains(TAVILY_KEY_VAR));
        assert!(!message.contains(GEMINI_KEY_VAR));
    }

    #[test]
    fn test_blank_credentials_count_as_missing() {
        let err = Credentials::from_lookup(|_| Some("  ".to_string())).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY and TAVILY_API_KEY"));
    }

    #[test]
    fn test_settings_file_round_trip_keeps_partial_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"user_name": "Ada", "max_results": 4}"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.user_name, "Ada");
        assert_eq!(settings.max_results, 4);
        assert_eq!(settings.max_questions, MAX_QUESTIONS);
        assert_eq!(settings.full_model, MODEL);
    }

    #[test]
    fn test_zero_max_results_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        Settings {
            max_results: 0,
            ..Default::default()
        }
        .save_to(&path)
        .unwrap();

        assert!(matches!(Settings::load_from(&path), Err(ResearchError::Config(_))));
    }

    #[test]
    fn test_question_cap_cannot_be_raised() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"max_questions": 5}"#).unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("between 1 and 3"));
    }
}
