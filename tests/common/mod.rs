#![allow(dead_code)]

use async_trait::async_trait;
use deep_research::llm::{CompletionModel, CompletionRequest, LlmResponse};
use deep_research::{
    MemorySessionStore, ModelProfiles, ResearchService, SearchBackend, SessionStore, Settings,
};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tavily::{SearchRequest, SearchResponse, SearchResult, TavilyError};

/// Answers model calls from a fixed queue and records every request
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    pub fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }

    /// Flattened prompt of the n-th request
    pub fn prompt(&self, n: usize) -> String {
        self.requests()[n].transcript_prompt()
    }
}

#[async_trait]
impl CompletionModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> anyhow::Result<LlmResponse> {
        self.requests.lock().unwrap().push(request);
        let content = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("scripted model has no reply left"))?;
        Ok(LlmResponse {
            content,
            model: "scripted".to_string(),
            finish_reason: Some("stop".to_string()),
        })
    }
}

/// Search backend that either returns one hit or fails every call
pub struct ScriptedSearch {
    fail: bool,
    pub requests: Mutex<Vec<SearchRequest>>,
}

impl ScriptedSearch {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self { fail: false, requests: Mutex::new(Vec::new()) })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { fail: true, requests: Mutex::new(Vec::new()) })
    }
}

#[async_trait]
impl SearchBackend for ScriptedSearch {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, TavilyError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(TavilyError::Api {
                status: 502,
                body: "connection reset by peer".to_string(),
            });
        }
        Ok(SearchResponse {
            query: request.query.clone(),
            answer: None,
            results: vec![SearchResult {
                title: "Fitness app market".to_string(),
                url: "https://example.com/fitness".to_string(),
                content: "The fitness app market keeps growing.".to_string(),
                score: 0.9,
                raw_content: None,
            }],
            response_time: 0.2,
        })
    }
}

pub fn test_settings(researches_dir: &Path) -> Settings {
    Settings {
        researches_dir: researches_dir.to_path_buf(),
        ..Default::default()
    }
}

pub struct Harness {
    pub model: Arc<ScriptedModel>,
    pub search: Arc<ScriptedSearch>,
    pub store: Arc<MemorySessionStore>,
    pub service: ResearchService,
}

pub fn harness(settings: Settings, model: Arc<ScriptedModel>, search: Arc<ScriptedSearch>) -> Harness {
    let store = Arc::new(MemorySessionStore::new());
    let service = ResearchService::new(
        settings,
        ModelProfiles::single(model.clone()),
        search.clone(),
        store.clone() as Arc<dyn SessionStore>,
    );
    Harness { model, search, store, service }
}

pub fn guardrail_pass() -> String {
    r#"{"output_info": "A concrete product idea", "tripwire_triggered": false}"#.to_string()
}

pub fn guardrail_fail() -> String {
    r#"{"output_info": "This is a greeting, not a business idea", "tripwire_triggered": true}"#.to_string()
}

pub fn question(number: u32, text: &str) -> String {
    serde_json::json!({
        "question": text,
        "question_number": number,
        "requirements_confirmed": false,
        "max_questions_reached": false,
    })
    .to_string()
}

pub fn call(capability: &str, input: serde_json::Value) -> String {
    serde_json::json!({"action": "call", "capability": capability, "input": input}).to_string()
}
