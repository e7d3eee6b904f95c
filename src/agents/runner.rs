// Deep-Research: Agent Runner
// The bounded delegation loop every agent runs through:
// one model call per round, each reply is either a capability call or the final answer

use super::Agent;
use crate::error::{ResearchError, Result};
use crate::llm::{self, ModelProfile, ModelProfiles, SystemPrompts};
use crate::session::{to_messages, SessionItem};
use crate::tools::{Capability, CapabilityRegistry, RunContext};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

/// An agent: instructions, a model profile and the capabilities it may call
#[derive(Clone)]
pub struct AgentDefinition {
    pub name: String,
    /// What callers see when the agent is exposed as a capability
    pub description: String,
    pub instructions: String,
    pub profile: ModelProfile,
    pub temperature: Option<f32>,
    pub capabilities: CapabilityRegistry,
    pub max_rounds: usize,
    /// Capabilities that must have been called before a final answer is accepted
    pub required_before_final: Vec<String>,
}

impl AgentDefinition {
    pub fn new(name: &str, instructions: &str, profile: ModelProfile) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            instructions: instructions.to_string(),
            profile,
            temperature: None,
            capabilities: CapabilityRegistry::new(),
            max_rounds: 1,
            required_before_final: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_capability(mut self, capability: Arc<dyn Capability>) -> Self {
        self.capabilities.register(capability);
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    pub fn requiring(mut self, capability: &str) -> Self {
        self.required_before_final.push(capability.to_string());
        self
    }

    /// Instructions plus the action protocol and capability catalogue
    pub fn full_instructions(&self) -> String {
        if self.capabilities.is_empty() {
            return self.instructions.clone();
        }
        format!(
            "{}\n\n{}\n{}",
            self.instructions.trim_end(),
            SystemPrompts::action_protocol().trim_end(),
            self.capabilities.catalogue()
        )
    }
}

impl Agent for AgentDefinition {
    fn name(&self) -> &str {
        &self.name
    }

    fn system_prompt(&self) -> &str {
        &self.instructions
    }
}

/// A reply, read as an action
#[derive(Debug, Clone, PartialEq)]
pub enum AgentAction {
    Call { capability: String, input: Value },
    Final(String),
}

impl AgentAction {
    /// JSON with `"action": "call"` (or just a `capability`) is a call,
    /// `"action": "final"` carries the answer, anything else is the answer verbatim.
    pub fn parse(reply: &str) -> Self {
        let trimmed = reply.trim();
        if !(trimmed.starts_with('{') || trimmed.starts_with("```")) {
            return AgentAction::Final(trimmed.to_string());
        }

        let Some(value) = llm::extract_json(trimmed)
            .and_then(|json| serde_json::from_str::<Value>(json).ok())
        else {
            return AgentAction::Final(trimmed.to_string());
        };

        let action = value.get("action").and_then(Value::as_str).unwrap_or("");
        if action == "final" {
            let output = match value.get("output") {
                Some(Value::String(text)) => text.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            return AgentAction::Final(output);
        }

        match value.get("capability").and_then(Value::as_str) {
            Some(capability) => AgentAction::Call {
                capability: capability.to_string(),
                input: value.get("input").cloned().unwrap_or_else(|| json!({})),
            },
            None => AgentAction::Final(trimmed.to_string()),
        }
    }
}

/// Result of one agent run
#[derive(Debug, Clone)]
pub struct AgentRun {
    pub output: String,
    /// Items produced during the run, in order
    pub new_items: Vec<SessionItem>,
    pub rounds: usize,
    /// Capability names called, in order
    pub calls: Vec<String>,
}

/// Runs agent definitions against the model profiles
#[derive(Clone)]
pub struct AgentRunner {
    models: ModelProfiles,
}

impl AgentRunner {
    pub fn new(models: ModelProfiles) -> Self {
        Self { models }
    }

    pub fn models(&self) -> &ModelProfiles {
        &self.models
    }

    /// Run `agent` over `history` (which already holds its input)
    pub async fn run(
        &self,
        agent: &AgentDefinition,
        ctx: &RunContext,
        history: Vec<SessionItem>,
    ) -> Result<AgentRun> {
        let hooks = ctx.hooks.clone();
        let model = self.models.model(agent.profile);
        let system = agent.full_instructions();

        hooks.on_agent_start(&agent.name).await;
        log::info!("{} started ({} profile)", agent.name, agent.profile.as_str());

        let mut transcript = history;
        let mut new_items = Vec::new();
        let mut calls: Vec<String> = Vec::new();

        for round in 1..=agent.max_rounds {
            hooks.on_llm_start(&agent.name).await;
            let reply = llm::complete_with_system(
                &model,
                &system,
                &to_messages(&transcript),
                agent.temperature,
            )
            .await?;
            hooks.on_llm_end(&agent.name).await;

            let action = if agent.capabilities.is_empty() {
                AgentAction::Final(reply.trim().to_string())
            } else {
                AgentAction::parse(&reply)
            };

            match action {
                AgentAction::Call { capability, input } => {
                    log::debug!("{} round {}: calling {}", agent.name, round, capability);
                    hooks.on_tool_start(&agent.name, &capability).await;
                    let result = agent
                        .capabilities
                        .invoke(&capability, ctx, input.clone())
                        .await?;
                    hooks.on_tool_end(&agent.name, &capability, &result).await;

                    let items = [
                        SessionItem::tool_call(&capability, input),
                        SessionItem::tool_result(&capability, &result),
                    ];
                    transcript.extend_from_slice(&items);
                    new_items.extend_from_slice(&items);
                    calls.push(capability);
                }
                AgentAction::Final(output) => {
                    let missing: Vec<&str> = agent
                        .required_before_final
                        .iter()
                        .filter(|required| !calls.contains(*required))
                        .map(String::as_str)
                        .collect();

                    if !missing.is_empty() {
                        log::warn!(
                            "{} tried to finish without consulting {}",
                            agent.name,
                            missing.join(", ")
                        );
                        let items = [
                            SessionItem::assistant(&output),
                            SessionItem::user(&format!(
                                "You have not consulted {} yet. Call it before giving your final answer.",
                                missing.join(", ")
                            )),
                        ];
                        transcript.extend_from_slice(&items);
                        new_items.extend_from_slice(&items);
                        continue;
                    }

                    new_items.push(SessionItem::assistant(&output));
                    hooks.on_agent_end(&agent.name, &output).await;
                    log::info!("{} finished after {} round(s)", agent.name, round);
                    return Ok(AgentRun {
                        output,
                        new_items,
                        rounds: round,
                        calls,
                    });
                }
            }
        }

        log::error!("{} hit its round limit of {}", agent.name, agent.max_rounds);
        Err(ResearchError::RoundLimitExceeded {
            agent: agent.name.clone(),
            rounds: agent.max_rounds,
        })
    }
}

/// Exposes an agent as a capability taking `{"input": "<text>"}`.
/// Only the agent's final text reaches the caller; a failed run comes back as "<name> failed: ...".
pub struct AgentCapability {
    agent: Arc<AgentDefinition>,
    runner: AgentRunner,
}

impl AgentCapability {
    pub fn new(agent: AgentDefinition, runner: AgentRunner) -> Self {
        Self {
            agent: Arc::new(agent),
            runner,
        }
    }
}

#[async_trait]
impl Capability for AgentCapability {
    fn name(&self) -> &str {
        &self.agent.name
    }

    fn description(&self) -> &str {
        &self.agent.description
    }

    fn parameters(&self) -> Value {
        json!({"input": "the task for this agent, as text"})
    }

    async fn invoke(&self, ctx: &RunContext, args: Value) -> Result<String> {
        let input = match &args {
            Value::String(text) => text.clone(),
            other => other
                .get("input")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| other.to_string()),
        };

        match self
            .runner
            .run(&self.agent, ctx, vec![SessionItem::user(&input)])
            .await
        {
            Ok(run) => Ok(run.output),
            Err(e) => {
                log::warn!("{} failed: {}", self.agent.name, e);
                Ok(format!("{} failed: {}", self.agent.name, e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_final() {
        assert_eq!(
            AgentAction::parse("  The report.  "),
            AgentAction::Final("The report.".to_string())
        );
    }

    #[test]
    fn test_call_action_is_parsed() {
        let action = AgentAction::parse(
            r#"{"action": "call", "capability": "search_web", "input": {"query": "gyms"}}"#,
        );
        assert_eq!(
            action,
            AgentAction::Call {
                capability: "search_web".to_string(),
                input: json!({"query": "gyms"}),
            }
        );
    }

    #[test]
    fn test_fenced_call_without_action_field_is_a_call() {
        let action = AgentAction::parse("```json\n{\"capability\": \"get_today_date\"}\n```");
        assert_eq!(
            action,
            AgentAction::Call {
                capability: "get_today_date".to_string(),
                input: json!({}),
            }
        );
    }

    #[test]
    fn test_final_action_unwraps_output() {
        assert_eq!(
            AgentAction::parse(r#"{"action": "final", "output": "done"}"#),
            AgentAction::Final("done".to_string())
        );
    }

    #[test]
    fn test_unrecognized_json_is_kept_as_answer() {
        let reply = r#"{"summary": "market is large"}"#;
        assert_eq!(AgentAction::parse(reply), AgentAction::Final(reply.to_string()));
    }

    #[test]
    fn test_catalogue_only_when_capabilities_exist() {
        let bare = AgentDefinition::new("analysis_agent", "Analyze.", ModelProfile::Full);
        assert_eq!(bare.full_instructions(), "Analyze.");

        let tooled = bare.with_capability(Arc::new(crate::tools::TodayDate));
        assert!(tooled.full_instructions().contains("`get_today_date`"));
    }
}
