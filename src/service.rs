// Deep-Research: Research Service
// Wires every stage together behind the two pipeline entry points

use crate::agents::guardrail::Guardrail;
use crate::agents::orchestrator::{Orchestrator, OrchestratorLimits, ResearchRun};
use crate::agents::planner::{PlannedResearch, Planner};
use crate::agents::requirements::{DialogueOutcome, RequirementsDialogue, ResponseSource};
use crate::agents::runner::AgentRunner;
use crate::config::{Credentials, Settings};
use crate::error::{ResearchError, Result};
use crate::llm::{LlmConfig, ModelProfile, ModelProfiles, ProviderType};
use crate::models::{PreferenceContext, ResearchPlan};
use crate::monitor::RunHooks;
use crate::report::ReportWriter;
use crate::session::SessionStore;
use crate::tools::{RunContext, SearchBackend};
use std::path::PathBuf;
use std::sync::Arc;
use tavily::TavilyClient;
use uuid::Uuid;

pub const REQUIREMENTS_SESSION: &str = "requirements_gathering";
pub const PLANNER_SESSION: &str = "planner";

/// Everything one research pass produced
#[derive(Debug, Clone)]
pub struct ResearchReport {
    pub requirements: String,
    pub plan: ResearchPlan,
    pub run: ResearchRun,
    /// Where the report was written, if it was
    pub saved_to: Option<PathBuf>,
}

impl ResearchReport {
    pub fn report(&self) -> &str {
        &self.run.report
    }
}

pub struct ResearchService {
    settings: Settings,
    models: ModelProfiles,
    search: Arc<dyn SearchBackend>,
    store: Arc<dyn SessionStore>,
    run_id: Uuid,
}

impl ResearchService {
    pub fn new(
        settings: Settings,
        models: ModelProfiles,
        search: Arc<dyn SearchBackend>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            settings,
            models,
            search,
            store,
            run_id: Uuid::new_v4(),
        }
    }

    /// Real model provider and Tavily client from the loaded credentials
    pub fn from_credentials(
        settings: Settings,
        credentials: &Credentials,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        let lite = llm_config(&settings, &settings.lite_model, &credentials.model_api_key)?;
        let full = llm_config(&settings, &settings.full_model, &credentials.model_api_key)?;
        let models = ModelProfiles::from_configs(lite, full)?;

        let search = TavilyClient::new(credentials.search_api_key.as_str())
            .map_err(|e| ResearchError::Config(e.to_string()))?;

        Ok(Self::new(settings, models, Arc::new(search), store))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn requirements_session_key(&self) -> String {
        format!("{}-{}", REQUIREMENTS_SESSION, self.run_id)
    }

    pub fn planner_session_key(&self) -> String {
        format!("{}-{}", PLANNER_SESSION, self.run_id)
    }

    /// Preferences for this run, from settings
    pub fn preferences(&self) -> PreferenceContext {
        PreferenceContext::new(&self.settings.user_name, self.settings.max_results)
    }

    /// Guardrail plus the requirements dialogue for `idea`
    pub async fn gather_requirements(
        &self,
        idea: &str,
        responses: &mut dyn ResponseSource,
    ) -> Result<DialogueOutcome> {
        let lite = self.models.model(ModelProfile::Lite);
        let mut dialogue = RequirementsDialogue::new(
            lite.clone(),
            Guardrail::new(lite),
            self.store.clone(),
            &self.requirements_session_key(),
        )
        .with_max_questions(self.settings.max_questions);

        let outcome = dialogue.drive(idea, responses).await?;
        match &outcome {
            DialogueOutcome::Confirmed { turns, .. } => {
                log::info!("Requirements confirmed after {} turn(s)", turns.len())
            }
            DialogueOutcome::Aborted { reason } => log::info!("Requirements dialogue aborted: {}", reason),
            DialogueOutcome::Abandoned { .. } => log::info!("Requirements dialogue abandoned"),
        }
        Ok(outcome)
    }

    /// Planner, handoff, orchestration and report file.
    /// Blank requirements decline the run and return `None`.
    pub async fn execute_research_plan(
        &self,
        requirements: &str,
        preferences: PreferenceContext,
        hooks: Arc<dyn RunHooks>,
    ) -> Result<Option<ResearchReport>> {
        let requirements = requirements.trim();
        if requirements.is_empty() {
            log::warn!("No research requirements found, not starting research");
            return Ok(None);
        }

        let ctx = RunContext::new(preferences, hooks);
        let runner = AgentRunner::new(self.models.clone());
        let orchestrator = Orchestrator::new(
            runner,
            self.search.clone(),
            self.settings.search_depth,
            OrchestratorLimits {
                max_rounds: self.settings.max_orchestrator_rounds,
                max_search_rounds: self.settings.max_search_rounds,
            },
        );
        let planner = Planner::new(
            self.models.model(ModelProfile::Full),
            self.store.clone(),
            &self.planner_session_key(),
        );

        let PlannedResearch { plan, run } = planner
            .plan_and_hand_off(requirements, &orchestrator, &ctx)
            .await?;

        let saved_to = ReportWriter::new(&self.settings.researches_dir)
            .save(&run.report, requirements)
            .await;

        Ok(Some(ResearchReport {
            requirements: requirements.to_string(),
            plan,
            run,
            saved_to,
        }))
    }
}

fn llm_config(settings: &Settings, model: &str, api_key: &str) -> Result<LlmConfig> {
    let config = match settings.provider {
        ProviderType::Gemini => LlmConfig::gemini(model, api_key),
        ProviderType::OpenAI => LlmConfig {
            provider: ProviderType::OpenAI,
            model: model.to_string(),
            api_key: Some(api_key.to_string()),
            base_url: None,
            temperature: None,
        },
        ProviderType::OpenAICompatible => {
            let base_url = settings.base_url.as_deref().ok_or_else(|| {
                ResearchError::Config("base_url is required for an OpenAI-compatible provider".to_string())
            })?;
            LlmConfig::openai_compatible(base_url, model, Some(api_key.to_string()))
        }
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compatible_provider_needs_base_url() {
        let settings = Settings {
            provider: ProviderType::OpenAICompatible,
            ..Default::default()
        };
        assert!(matches!(
            llm_config(&settings, "local-model", "key"),
            Err(ResearchError::Config(_))
        ));

        let settings = Settings {
            base_url: Some("http://localhost:8080/v1".to_string()),
            ..settings
        };
        let config = llm_config(&settings, "local-model", "key").unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080/v1"));
    }

    #[test]
    fn test_gemini_is_the_default_provider() {
        let config = llm_config(&Settings::default(), "gemini-2.5-flash", "key").unwrap();
        assert_eq!(config.provider, ProviderType::Gemini);
        assert_eq!(config.model, "gemini-2.5-flash");
    }
}
