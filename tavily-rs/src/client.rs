// Tavily search client for Deep-Research
// Thin HTTP wrapper over the Tavily `/search` endpoint

use crate::error::{Result, TavilyError};
use crate::models::{SearchRequest, SearchResponse};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

/// Configuration for the Tavily client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TavilyConfig {
    /// API base URL, overridable for tests and proxies
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for TavilyConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
            user_agent: "deep-research/0.1 (+tavily-rs)".to_string(),
        }
    }
}

/// Tavily REST client
#[derive(Debug, Clone)]
pub struct TavilyClient {
    client: Client,
    api_key: String,
    config: TavilyConfig,
}

impl TavilyClient {
    /// Create a client against the public endpoint
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, TavilyConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(api_key: impl Into<String>, config: TavilyConfig) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(TavilyError::InvalidRequest("API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client, api_key, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Run one search
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        if request.query.trim().is_empty() {
            return Err(TavilyError::InvalidRequest("query is empty".to_string()));
        }

        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        log::debug!(
            "Tavily search ({}, max {}): {}",
            request.search_depth,
            request.max_results,
            request.query
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(TavilyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| TavilyError::Decode(e.to_string()))
    }
}
