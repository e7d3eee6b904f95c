// Deep-Research: Business Idea Research System
// Guardrail -> requirements dialogue -> planner -> orchestrated research -> report

// Settings, credentials and constants
pub mod config;

// Error taxonomy
pub mod error;

// Data shared across stages
pub mod models;

// LLM abstraction layer - unified provider interface
pub mod llm;

// Keyed conversation transcripts
pub mod session;

// Lifecycle hooks and the console monitor
pub mod monitor;

// Capabilities agents can call - search tools, date lookup
pub mod tools;

// Agent System module - Guardrail, Requirements, Planner, Orchestrator
pub mod agents;

// Markdown report file
pub mod report;

// Pipeline entry points
pub mod service;

// Re-export the types most callers need
pub use agents::{
    Agent, DialogueOutcome, Orchestrator, Planner, RequirementsDialogue, ResearchRun,
    ResponseSource, ScriptedResponses,
};
pub use config::{Credentials, Settings};
pub use error::{ResearchError, Result};
pub use llm::{CompletionModel, LlmConfig, LlmProvider, ModelProfile, ModelProfiles};
pub use models::{DialogueTurnOutput, GuardrailVerdict, PreferenceContext, ResearchPlan};
pub use monitor::{MonitorStats, NoopHooks, RunHooks, SystemMonitor};
pub use report::ReportWriter;
pub use service::{ResearchReport, ResearchService};
pub use session::{FileSessionStore, MemorySessionStore, SessionItem, SessionStore};
pub use tools::{Capability, CapabilityRegistry, RunContext, SearchBackend};
