// Deep-Research: Unified LLM API Layer
// Provides a consistent interface for all model calls using rig-core

pub mod provider;
pub mod prompts;
pub mod structured;

pub use provider::{
    CompletionModel, CompletionRequest, LlmConfig, LlmProvider, LlmResponse, Message,
    ModelProfile, ModelProfiles, ProviderType, Role,
};
pub use prompts::{PromptContext, PromptTemplate, SystemPrompts};
pub use structured::{extract_json, parse_structured, strict_json};

use std::sync::Arc;

/// Complete with a system prompt and a message history
pub async fn complete_with_system(
    model: &Arc<dyn CompletionModel>,
    system: &str,
    history: &[Message],
    temperature: Option<f32>,
) -> Result<String, anyhow::Error> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(Message::system(system));
    messages.extend_from_slice(history);

    let request = CompletionRequest::new(messages).with_temperature(temperature);
    log::debug!(
        "Calling {} with {} message(s)",
        model.model_name(),
        request.messages.len()
    );
    let response = model.complete(request).await?;
    Ok(response.content)
}
