// Deep-Research: Agent System
// Guardrail -> requirements dialogue -> planner -> orchestrator with its specialists

pub mod guardrail;
pub mod orchestrator;
pub mod planner;
pub mod requirements;
pub mod research;
pub mod runner;

// Re-exports
pub use guardrail::Guardrail;
pub use orchestrator::{Orchestrator, OrchestratorLimits, ResearchRun};
pub use planner::Planner;
pub use requirements::{
    DialogueOutcome, DialogueState, DialogueStep, RequirementsDialogue, ResponseSource,
    ScriptedResponses,
};
pub use research::{analysis_agent, reports_agent, search_agent};
pub use runner::{AgentCapability, AgentDefinition, AgentRun, AgentRunner};

/// Base trait for all agents
pub trait Agent: Send + Sync {
    /// Get the agent's name
    fn name(&self) -> &str;

    /// Get the agent's system prompt
    fn system_prompt(&self) -> &str;
}
