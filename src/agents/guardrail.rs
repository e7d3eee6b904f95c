// Deep-Research: Guardrail Check
// One-shot classifier deciding whether the input is a business idea

use super::Agent;
use crate::error::{ResearchError, Result};
use crate::llm::{self, CompletionModel, Message, SystemPrompts};
use crate::models::{GuardrailOutcome, GuardrailVerdict};
use std::sync::Arc;

pub const GUARDRAIL_AGENT: &str = "guard_rail_agent";
pub const GUARDRAIL_TEMPERATURE: f32 = 0.1;

pub struct Guardrail {
    model: Arc<dyn CompletionModel>,
    temperature: f32,
}

impl Guardrail {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self {
            model,
            temperature: GUARDRAIL_TEMPERATURE,
        }
    }

    /// Raw verdict. A failed call or unparsable reply is an error, never a pass.
    pub async fn classify(&self, idea: &str) -> Result<GuardrailVerdict> {
        let response = llm::complete_with_system(
            &self.model,
            self.system_prompt(),
            &[Message::user(idea)],
            Some(self.temperature),
        )
        .await
        .map_err(|e| ResearchError::GuardrailFailed(e.to_string()))?;

        llm::parse_structured::<GuardrailVerdict>(self.name(), &response)
            .map_err(|e| ResearchError::GuardrailFailed(e.to_string()))
    }

    /// Verdict mapped to "Passed"/"Failed"
    pub async fn check(&self, idea: &str) -> Result<GuardrailOutcome> {
        let verdict = self.classify(idea).await?;
        log::info!(
            "Guardrail verdict: tripwire={} ({})",
            verdict.tripwire_triggered,
            verdict.output_info
        );
        Ok(GuardrailOutcome::from_verdict(verdict))
    }
}

impl Agent for Guardrail {
    fn name(&self) -> &str {
        GUARDRAIL_AGENT
    }

    fn system_prompt(&self) -> &str {
        SystemPrompts::guardrail()
    }
}
