// Deep-Research: Data model shared across stages

use serde::{Deserialize, Serialize};

/// User preferences shared read-only with every tool invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreferenceContext {
    /// The name of the user
    pub name: String,
    /// Upper bound on results per search request
    pub max_results: u32,
}

impl PreferenceContext {
    /// `max_results` is clamped to at least 1
    pub fn new(name: &str, max_results: u32) -> Self {
        Self {
            name: name.to_string(),
            max_results: max_results.max(1),
        }
    }
}

impl Default for PreferenceContext {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_USER_NAME, crate::config::DEFAULT_MAX_RESULTS)
    }
}

/// One round of the requirements dialogue, as produced by the model
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DialogueTurnOutput {
    /// The question to ask the user
    pub question: String,
    /// The number of the question
    pub question_number: u32,
    /// Set once the requirements are agreed
    pub requirements_confirmed: bool,
    /// Set once the question budget is spent
    pub max_questions_reached: bool,
    /// A summary of the requirements
    pub requirements_summary: String,
}

impl DialogueTurnOutput {
    pub fn is_terminal(&self) -> bool {
        self.requirements_confirmed || self.max_questions_reached
    }
}

/// Raw guardrail classification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuardrailVerdict {
    pub output_info: String,
    pub tripwire_triggered: bool,
}

/// What the dialogue sees from the guardrail: "Passed" or "Failed"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuardrailOutcome {
    pub output_info: String,
    pub tripwire_triggered: bool,
    pub verdict: GuardrailVerdict,
}

impl GuardrailOutcome {
    pub fn from_verdict(verdict: GuardrailVerdict) -> Self {
        let output_info = if verdict.tripwire_triggered { "Failed" } else { "Passed" };
        Self {
            output_info: output_info.to_string(),
            tripwire_triggered: verdict.tripwire_triggered,
            verdict,
        }
    }

    pub fn passed(&self) -> bool {
        !self.tripwire_triggered
    }
}

/// The planner's output; free text the pipeline never parses
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResearchPlan {
    pub research_plan: String,
}
