// Deep-Research: LLM Provider Abstraction
// Unified interface for every model call:
// - Gemini: via rig-core's native Gemini client
// - OpenAI/Compatible: via rig-core with custom base_url

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Supported LLM providers
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum ProviderType {
    #[default]
    Gemini,
    OpenAI,
    /// Any OpenAI-compatible API (requires base_url)
    OpenAICompatible,
}

/// The two capability profiles consumers can ask for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ModelProfile {
    /// Low latency, low cost
    Lite,
    /// Higher capability
    Full,
}

impl ModelProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelProfile::Lite => "lite",
            ModelProfile::Full => "full",
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: ProviderType,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
}

impl LlmConfig {
    /// Gemini configuration for the given model name
    pub fn gemini(model: &str, api_key: &str) -> Self {
        Self {
            provider: ProviderType::Gemini,
            model: model.to_string(),
            api_key: Some(api_key.to_string()),
            base_url: None,
            temperature: None,
        }
    }

    /// Custom OpenAI-compatible API (e.g., local LLM servers)
    pub fn openai_compatible(base_url: &str, model: &str, api_key: Option<String>) -> Self {
        Self {
            provider: ProviderType::OpenAICompatible,
            model: model.to_string(),
            api_key,
            base_url: Some(base_url.to_string()),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Message role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::System => "System",
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: &str) -> Self {
        Self { role: Role::System, content: content.to_string() }
    }

    pub fn user(content: &str) -> Self {
        Self { role: Role::User, content: content.to_string() }
    }

    pub fn assistant(content: &str) -> Self {
        Self { role: Role::Assistant, content: content.to_string() }
    }
}

/// A single completion call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages, temperature: None }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// System instructions, joined
    pub fn system_prompt(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Everything after the system prompt, flattened into one prompt.
    /// A lone user message is passed through untouched.
    pub fn transcript_prompt(&self) -> String {
        let turns: Vec<&Message> = self
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .collect();

        match turns.as_slice() {
            [only] if only.role == Role::User => only.content.clone(),
            _ => turns
                .iter()
                .map(|m| format!("{}: {}", m.role.label(), m.content))
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }
}

/// LLM response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub finish_reason: Option<String>,
}

/// Anything that can answer a completion request
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Model identifier, for logs
    fn model_name(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<LlmResponse, anyhow::Error>;
}

/// Unified LLM provider
#[derive(Debug, Clone)]
pub struct LlmProvider {
    config: LlmConfig,
}

impl LlmProvider {
    pub fn new(config: LlmConfig) -> Result<Self, anyhow::Error> {
        if config.api_key.is_none() {
            anyhow::bail!("API key not configured for {:?}", config.provider);
        }
        if config.provider == ProviderType::OpenAICompatible && config.base_url.is_none() {
            anyhow::bail!("base_url required for OpenAICompatible");
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn call_llm(&self, system: &str, user: &str, temperature: Option<f32>) -> Result<String, anyhow::Error> {
        match self.config.provider {
            ProviderType::Gemini => self.call_gemini(system, user, temperature).await,
            ProviderType::OpenAI => self.call_openai(system, user, temperature, None).await,
            ProviderType::OpenAICompatible => {
                let base_url = self.config.base_url.as_deref()
                    .ok_or_else(|| anyhow::anyhow!("base_url required for OpenAICompatible"))?;
                self.call_openai(system, user, temperature, Some(base_url)).await
            }
        }
    }

    /// Call Gemini using rig-core's native provider
    async fn call_gemini(&self, system: &str, user: &str, temperature: Option<f32>) -> Result<String, anyhow::Error> {
        use rig::client::CompletionClient;
        use rig::completion::Prompt;
        use rig::providers::gemini;

        let api_key = self.config.api_key.as_ref()
            .ok_or_else(|| anyhow::anyhow!("Gemini API key not configured"))?;

        let client: gemini::Client = gemini::Client::new(api_key)?;
        let mut builder = client.agent(&self.config.model).preamble(system);
        if let Some(t) = temperature {
            builder = builder.temperature(t as f64);
        }
        let agent = builder.build();

        let response = agent.prompt(user).await?;
        Ok(response)
    }

    /// Call OpenAI or OpenAI-compatible API using rig-core
    async fn call_openai(
        &self,
        system: &str,
        user: &str,
        temperature: Option<f32>,
        base_url: Option<&str>,
    ) -> Result<String, anyhow::Error> {
        use rig::client::CompletionClient;
        use rig::completion::Prompt;
        use rig::providers::openai;

        let api_key = self.config.api_key.as_ref()
            .ok_or_else(|| anyhow::anyhow!("OpenAI API key not configured"))?;

        let client: openai::Client = match base_url {
            Some(url) => openai::Client::builder()
                .api_key(api_key)
                .base_url(url)
                .build()?,
            None => openai::Client::new(api_key)?,
        };

        let mut builder = client.agent(&self.config.model).preamble(system);
        if let Some(t) = temperature {
            builder = builder.temperature(t as f64);
        }
        let agent = builder.build();

        let response = agent.prompt(user).await?;
        Ok(response)
    }
}

#[async_trait]
impl CompletionModel for LlmProvider {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<LlmResponse, anyhow::Error> {
        let system_prompt = request.system_prompt();
        let user_prompt = request.transcript_prompt();
        let temperature = request.temperature.or(self.config.temperature);

        let content = self.call_llm(&system_prompt, &user_prompt, temperature).await?;

        Ok(LlmResponse {
            content,
            model: self.config.model.clone(),
            finish_reason: Some("stop".to_string()),
        })
    }
}

/// Hands out models by profile
#[derive(Clone)]
pub struct ModelProfiles {
    lite: Arc<dyn CompletionModel>,
    full: Arc<dyn CompletionModel>,
}

impl ModelProfiles {
    pub fn new(lite: Arc<dyn CompletionModel>, full: Arc<dyn CompletionModel>) -> Self {
        Self { lite, full }
    }

    /// Same model behind both profiles (tests, single-model setups)
    pub fn single(model: Arc<dyn CompletionModel>) -> Self {
        Self { lite: model.clone(), full: model }
    }

    /// Build both profiles from provider settings
    pub fn from_configs(lite: LlmConfig, full: LlmConfig) -> Result<Self, anyhow::Error> {
        Ok(Self {
            lite: Arc::new(LlmProvider::new(lite)?),
            full: Arc::new(LlmProvider::new(full)?),
        })
    }

    pub fn model(&self, profile: ModelProfile) -> Arc<dyn CompletionModel> {
        match profile {
            ModelProfile::Lite => self.lite.clone(),
            ModelProfile::Full => self.full.clone(),
        }
    }
}
