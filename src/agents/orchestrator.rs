// Deep-Research: Lead Orchestrator
// Drives search -> analysis -> reports and synthesizes the final report

use super::research::{analysis_agent, reports_agent, search_agent, ANALYSIS_AGENT, REPORTS_AGENT, SEARCH_AGENT};
use super::runner::{AgentCapability, AgentDefinition, AgentRunner};
use super::Agent;
use crate::config::{MAX_ORCHESTRATOR_ROUNDS, MAX_SEARCH_ROUNDS};
use crate::error::Result;
use crate::llm::{ModelProfile, SystemPrompts};
use crate::session::SessionItem;
use crate::tools::{RunContext, SearchBackend, TodayDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tavily::SearchDepth;

pub const ORCHESTRATOR_AGENT: &str = "orchestrator_agent";

/// Steps the orchestrator is expected to take, in order
pub const RESEARCH_STEPS: [&str; 3] = [SEARCH_AGENT, ANALYSIS_AGENT, REPORTS_AGENT];

/// Outcome of one orchestration pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchRun {
    pub report: String,
    /// Every capability call, in order
    pub consulted: Vec<String>,
    /// Expected steps that were never consulted
    pub skipped_steps: Vec<String>,
    pub rounds: usize,
    /// Items the orchestrator added to the conversation
    pub transcript: Vec<SessionItem>,
}

/// Round limits for the orchestrator and its search agent
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorLimits {
    pub max_rounds: usize,
    pub max_search_rounds: usize,
}

impl Default for OrchestratorLimits {
    fn default() -> Self {
        Self {
            max_rounds: MAX_ORCHESTRATOR_ROUNDS,
            max_search_rounds: MAX_SEARCH_ROUNDS,
        }
    }
}

pub struct Orchestrator {
    agent: AgentDefinition,
    runner: AgentRunner,
}

impl Orchestrator {
    pub fn new(
        runner: AgentRunner,
        backend: Arc<dyn SearchBackend>,
        default_depth: SearchDepth,
        limits: OrchestratorLimits,
    ) -> Self {
        let specialists = [
            search_agent(backend, default_depth, limits.max_search_rounds),
            analysis_agent(),
            reports_agent(),
        ];

        let mut agent = AgentDefinition::new(
            ORCHESTRATOR_AGENT,
            SystemPrompts::orchestrator(),
            ModelProfile::Full,
        )
        .with_max_rounds(limits.max_rounds)
        .requiring(SEARCH_AGENT);

        for specialist in specialists {
            agent = agent.with_capability(Arc::new(AgentCapability::new(specialist, runner.clone())));
        }
        agent = agent.with_capability(Arc::new(TodayDate));

        Self { agent, runner }
    }

    pub fn definition(&self) -> &AgentDefinition {
        &self.agent
    }

    /// Run over the handed-off context; `history` must not contain tool items
    pub async fn run(&self, ctx: &RunContext, history: Vec<SessionItem>) -> Result<ResearchRun> {
        let run = self.runner.run(&self.agent, ctx, history).await?;

        let skipped_steps: Vec<String> = RESEARCH_STEPS
            .iter()
            .filter(|step| !run.calls.iter().any(|c| c.as_str() == **step))
            .map(|step| step.to_string())
            .collect();
        if !skipped_steps.is_empty() {
            log::warn!(
                "{} finished without consulting: {}",
                self.name(),
                skipped_steps.join(", ")
            );
        }

        Ok(ResearchRun {
            report: run.output,
            consulted: run.calls,
            skipped_steps,
            rounds: run.rounds,
            transcript: run.new_items,
        })
    }
}

impl Agent for Orchestrator {
    fn name(&self) -> &str {
        &self.agent.name
    }

    fn system_prompt(&self) -> &str {
        &self.agent.instructions
    }
}
