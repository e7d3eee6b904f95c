// Deep-Research: Error taxonomy

use thiserror::Error;

/// Errors surfaced by the research pipeline
#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("LLM error: {0}")]
    Provider(String),

    #[error("{agent} returned output that does not match its schema: {message}")]
    StructuredOutput { agent: String, message: String },

    #[error("Guardrail check could not be completed: {0}")]
    GuardrailFailed(String),

    #[error("Invalid dialogue transition: {0}")]
    InvalidTransition(String),

    #[error("{agent} exceeded its limit of {rounds} rounds")]
    RoundLimitExceeded { agent: String, rounds: usize },

    #[error("Session store error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<anyhow::Error> for ResearchError {
    fn from(err: anyhow::Error) -> Self {
        ResearchError::Provider(err.to_string())
    }
}

impl From<std::io::Error> for ResearchError {
    fn from(err: std::io::Error) -> Self {
        ResearchError::Session(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ResearchError>;
