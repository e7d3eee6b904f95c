// Deep-Research: Requirements-Gathering Dialogue
// START -> ASKING(1) -> ... -> CONFIRMED, or ABORTED when the guardrail trips.
// The question counter is owned here; the model's own bookkeeping is advisory.

use super::guardrail::Guardrail;
use super::Agent;
use crate::config::MAX_QUESTIONS;
use crate::error::{ResearchError, Result};
use crate::llm::{self, prompts, CompletionModel, PromptContext, SystemPrompts};
use crate::models::DialogueTurnOutput;
use crate::session::{to_messages, SessionItem, SessionStore};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;

pub const REQUIREMENTS_AGENT: &str = "requirements_gathering_agent";
pub const REQUIREMENTS_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueState {
    Start,
    Asking { question_number: u32, question: String },
    Confirmed { summary: String },
    Aborted { reason: String },
    Abandoned,
}

impl DialogueState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DialogueState::Start | DialogueState::Asking { .. })
    }

    fn label(&self) -> String {
        match self {
            DialogueState::Start => "START".to_string(),
            DialogueState::Asking { question_number, .. } => format!("ASKING({})", question_number),
            DialogueState::Confirmed { .. } => "CONFIRMED".to_string(),
            DialogueState::Aborted { .. } => "ABORTED".to_string(),
            DialogueState::Abandoned => "ABANDONED".to_string(),
        }
    }
}

/// How a dialogue ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueOutcome {
    Confirmed {
        summary: String,
        turns: Vec<DialogueTurnOutput>,
    },
    /// Guardrail rejection; `reason` is "Failed"
    Aborted { reason: String },
    /// The caller stopped answering
    Abandoned { last_question: Option<String> },
}

impl DialogueOutcome {
    /// The requirements, when a non-empty summary was confirmed
    pub fn summary(&self) -> Option<&str> {
        match self {
            DialogueOutcome::Confirmed { summary, .. } if !summary.trim().is_empty() => {
                Some(summary.as_str())
            }
            _ => None,
        }
    }
}

/// What the caller sees after each transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueStep {
    /// A question is pending
    Question(DialogueTurnOutput),
    Finished(DialogueOutcome),
}

/// Where answers to pending questions come from
#[async_trait]
pub trait ResponseSource: Send {
    /// `None` means end of input
    async fn next_response(&mut self, turn: &DialogueTurnOutput) -> Option<String>;
}

/// Pre-recorded answers, consumed in order
#[derive(Debug, Clone, Default)]
pub struct ScriptedResponses {
    responses: VecDeque<String>,
}

impl ScriptedResponses {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.responses.len()
    }
}

#[async_trait]
impl ResponseSource for ScriptedResponses {
    async fn next_response(&mut self, turn: &DialogueTurnOutput) -> Option<String> {
        let response = self.responses.pop_front();
        if let Some(ref r) = response {
            log::debug!("Scripted answer to question {}: {}", turn.question_number, r);
        }
        response
    }
}

pub struct RequirementsDialogue {
    model: Arc<dyn CompletionModel>,
    guardrail: Guardrail,
    store: Arc<dyn SessionStore>,
    session_key: String,
    max_questions: u32,
    state: DialogueState,
    turns: Vec<DialogueTurnOutput>,
}

impl RequirementsDialogue {
    pub fn new(
        model: Arc<dyn CompletionModel>,
        guardrail: Guardrail,
        store: Arc<dyn SessionStore>,
        session_key: &str,
    ) -> Self {
        Self {
            model,
            guardrail,
            store,
            session_key: session_key.to_string(),
            max_questions: MAX_QUESTIONS,
            state: DialogueState::Start,
            turns: Vec::new(),
        }
    }

    /// Lower the question cap; it never goes above `MAX_QUESTIONS`
    pub fn with_max_questions(mut self, max_questions: u32) -> Self {
        self.max_questions = max_questions.clamp(1, MAX_QUESTIONS);
        self
    }

    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    pub fn turns(&self) -> &[DialogueTurnOutput] {
        &self.turns
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    /// Guardrail, then the first question
    pub async fn start(&mut self, idea: &str) -> Result<DialogueStep> {
        if self.state != DialogueState::Start {
            return Err(self.invalid("start"));
        }

        let outcome = self.guardrail.check(idea).await?;
        if !outcome.passed() {
            log::info!("Guardrail tripped: {}", outcome.verdict.output_info);
            self.state = DialogueState::Aborted {
                reason: outcome.output_info.clone(),
            };
            return Ok(DialogueStep::Finished(DialogueOutcome::Aborted {
                reason: outcome.output_info,
            }));
        }

        self.ask(idea, 1).await
    }

    /// Answer the pending question. A blank answer abandons the dialogue.
    pub async fn respond(&mut self, response: &str) -> Result<DialogueStep> {
        let current = match &self.state {
            DialogueState::Asking { question_number, .. } => *question_number,
            _ => return Err(self.invalid("respond")),
        };

        let response = response.trim();
        if response.is_empty() {
            return Ok(DialogueStep::Finished(self.abandon()));
        }

        let vars = PromptContext::new()
            .with_var("question_number", current)
            .with_var("response", response)
            .to_vars();
        let input = prompts::follow_up_template()
            .render(&vars)
            .map_err(ResearchError::InvalidTransition)?;

        self.ask(&input, current + 1).await
    }

    /// Stop without forcing confirmation. Finished dialogues keep their outcome.
    pub fn abandon(&mut self) -> DialogueOutcome {
        match &self.state {
            DialogueState::Confirmed { summary } => DialogueOutcome::Confirmed {
                summary: summary.clone(),
                turns: self.turns.clone(),
            },
            DialogueState::Aborted { reason } => DialogueOutcome::Aborted { reason: reason.clone() },
            DialogueState::Asking { question, .. } => {
                let last_question = Some(question.clone());
                log::info!("Dialogue abandoned in {}", self.state.label());
                self.state = DialogueState::Abandoned;
                DialogueOutcome::Abandoned { last_question }
            }
            DialogueState::Start | DialogueState::Abandoned => {
                self.state = DialogueState::Abandoned;
                DialogueOutcome::Abandoned {
                    last_question: self.turns.last().map(|t| t.question.clone()),
                }
            }
        }
    }

    /// Run the whole dialogue, pulling answers from `responses`
    pub async fn drive(
        &mut self,
        idea: &str,
        responses: &mut dyn ResponseSource,
    ) -> Result<DialogueOutcome> {
        let mut step = self.start(idea).await?;
        loop {
            match step {
                DialogueStep::Finished(outcome) => return Ok(outcome),
                DialogueStep::Question(turn) => match responses.next_response(&turn).await {
                    Some(response) if !response.trim().is_empty() => {
                        step = self.respond(&response).await?;
                    }
                    _ => return Ok(self.abandon()),
                },
            }
        }
    }

    /// One model round for question `expected`
    async fn ask(&mut self, input: &str, expected: u32) -> Result<DialogueStep> {
        self.store
            .append(&self.session_key, &[SessionItem::user(input)])
            .await?;
        let history = self.store.history(&self.session_key).await?;

        let reply = llm::complete_with_system(
            &self.model,
            self.system_prompt(),
            &to_messages(&history),
            Some(REQUIREMENTS_TEMPERATURE),
        )
        .await?;

        let turn = llm::parse_structured::<DialogueTurnOutput>(REQUIREMENTS_AGENT, &reply)?;
        let turn = self.enforce_counter(turn, expected);

        let recorded = serde_json::to_string(&turn).unwrap_or(reply);
        self.store
            .append(&self.session_key, &[SessionItem::assistant(&recorded)])
            .await?;

        Ok(self.advance(turn))
    }

    /// The counter is ours: overwrite it, and close the dialogue at the cap
    fn enforce_counter(&self, mut turn: DialogueTurnOutput, expected: u32) -> DialogueTurnOutput {
        if turn.question_number != expected {
            log::warn!(
                "Model reported question {} but this is question {}",
                turn.question_number,
                expected
            );
            turn.question_number = expected;
        }
        if expected >= self.max_questions {
            turn.max_questions_reached = true;
            turn.requirements_confirmed = true;
        }
        turn
    }

    fn advance(&mut self, turn: DialogueTurnOutput) -> DialogueStep {
        self.turns.push(turn.clone());

        if turn.is_terminal() {
            if turn.requirements_summary.trim().is_empty() {
                log::warn!("Requirements confirmed with an empty summary");
            }
            self.state = DialogueState::Confirmed {
                summary: turn.requirements_summary.clone(),
            };
            return DialogueStep::Finished(DialogueOutcome::Confirmed {
                summary: turn.requirements_summary,
                turns: self.turns.clone(),
            });
        }

        self.state = DialogueState::Asking {
            question_number: turn.question_number,
            question: turn.question.clone(),
        };
        DialogueStep::Question(turn)
    }

    fn invalid(&self, operation: &str) -> ResearchError {
        ResearchError::InvalidTransition(format!("cannot {} in state {}", operation, self.state.label()))
    }
}

impl Agent for RequirementsDialogue {
    fn name(&self) -> &str {
        REQUIREMENTS_AGENT
    }

    fn system_prompt(&self) -> &str {
        SystemPrompts::requirements()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_requires_non_empty_confirmation() {
        let empty = DialogueOutcome::Confirmed { summary: " ".to_string(), turns: vec![] };
        assert_eq!(empty.summary(), None);

        let aborted = DialogueOutcome::Aborted { reason: "Failed".to_string() };
        assert_eq!(aborted.summary(), None);

        let confirmed = DialogueOutcome::Confirmed { summary: "Fitness app".to_string(), turns: vec![] };
        assert_eq!(confirmed.summary(), Some("Fitness app"));
    }

    #[tokio::test]
    async fn test_scripted_responses_run_out() {
        let mut responses = ScriptedResponses::new(["first"]);
        let turn = DialogueTurnOutput::default();
        assert_eq!(responses.next_response(&turn).await.as_deref(), Some("first"));
        assert_eq!(responses.next_response(&turn).await, None);
        assert_eq!(responses.remaining(), 0);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!DialogueState::Start.is_terminal());
        assert!(DialogueState::Abandoned.is_terminal());
        assert!(DialogueState::Confirmed { summary: String::new() }.is_terminal());
    }
}
