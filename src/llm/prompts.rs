// Deep-Research: Prompt Engineering System
// Agent instructions embedded at compile time, plus `{{var}}` templates

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid template variable regex"));

/// Prompt template with variable substitution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub name: String,
    pub template: String,
    pub required_vars: Vec<String>,
}

impl PromptTemplate {
    pub fn new(name: &str, template: &str) -> Self {
        let mut required_vars: Vec<String> = Vec::new();
        for caps in VAR_PATTERN.captures_iter(template) {
            let var = caps[1].to_string();
            if !required_vars.contains(&var) {
                required_vars.push(var);
            }
        }

        Self {
            name: name.to_string(),
            template: template.to_string(),
            required_vars,
        }
    }

    /// Render the template with provided variables
    pub fn render(&self, vars: &HashMap<String, String>) -> Result<String, String> {
        let mut result = self.template.clone();

        for var in &self.required_vars {
            let placeholder = format!("{{{{{}}}}}", var);
            let value = vars
                .get(var)
                .ok_or_else(|| format!("Missing required variable '{}' in {}", var, self.name))?;
            result = result.replace(&placeholder, value);
        }

        Ok(result)
    }
}

/// Variables for prompt rendering
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    vars: HashMap<String, String>,
}

impl PromptContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, key: &str, value: impl ToString) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn to_vars(&self) -> HashMap<String, String> {
        self.vars.clone()
    }
}

/// Follow-up input for the requirements dialogue
pub fn follow_up_template() -> PromptTemplate {
    PromptTemplate::new(
        "requirements_follow_up",
        "Current question number: {{question_number}}. User response: {{response}}",
    )
}

/// Collection of system prompts for all agents
pub struct SystemPrompts;

impl SystemPrompts {
    /// Guardrail classifier
    pub fn guardrail() -> &'static str {
        include_str!("../../prompts/guardrail.md")
    }

    /// Requirements-gathering dialogue
    pub fn requirements() -> &'static str {
        include_str!("../../prompts/requirements.md")
    }

    /// Research planner
    pub fn planner() -> &'static str {
        include_str!("../../prompts/planner.md")
    }

    /// Orchestrator driving the specialist agents
    pub fn orchestrator() -> &'static str {
        include_str!("../../prompts/orchestrator.md")
    }

    /// Search agent
    pub fn search() -> &'static str {
        include_str!("../../prompts/search.md")
    }

    /// Analysis agent
    pub fn analysis() -> &'static str {
        include_str!("../../prompts/analysis.md")
    }

    /// Reports agent
    pub fn reports() -> &'static str {
        include_str!("../../prompts/reports.md")
    }

    /// Appended to every agent that can delegate
    pub fn action_protocol() -> &'static str {
        include_str!("../../prompts/action_protocol.md")
    }
}
