// Deep-Research: Conversation Sessions
// Ordered per-key transcripts, in memory or as JSONL files

use crate::error::{ResearchError, Result};
use crate::llm::{Message, Role};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

/// What a transcript entry records
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionItemKind {
    Message { role: Role, content: String },
    ToolCall { capability: String, input: serde_json::Value },
    ToolResult { capability: String, output: String },
}

/// One transcript entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionItem {
    #[serde(flatten)]
    pub kind: SessionItemKind,
    pub recorded_at: DateTime<Utc>,
}

impl SessionItem {
    fn new(kind: SessionItemKind) -> Self {
        Self { kind, recorded_at: Utc::now() }
    }

    pub fn user(content: &str) -> Self {
        Self::new(SessionItemKind::Message { role: Role::User, content: content.to_string() })
    }

    pub fn assistant(content: &str) -> Self {
        Self::new(SessionItemKind::Message { role: Role::Assistant, content: content.to_string() })
    }

    pub fn tool_call(capability: &str, input: serde_json::Value) -> Self {
        Self::new(SessionItemKind::ToolCall { capability: capability.to_string(), input })
    }

    pub fn tool_result(capability: &str, output: &str) -> Self {
        Self::new(SessionItemKind::ToolResult {
            capability: capability.to_string(),
            output: output.to_string(),
        })
    }

    pub fn is_tool_item(&self) -> bool {
        matches!(
            self.kind,
            SessionItemKind::ToolCall { .. } | SessionItemKind::ToolResult { .. }
        )
    }

    /// How the item reads in a model prompt
    pub fn to_message(&self) -> Message {
        match &self.kind {
            SessionItemKind::Message { role, content } => Message {
                role: *role,
                content: content.clone(),
            },
            SessionItemKind::ToolCall { capability, input } => Message::assistant(
                &serde_json::json!({
                    "action": "call",
                    "capability": capability,
                    "input": input,
                })
                .to_string(),
            ),
            SessionItemKind::ToolResult { capability, output } => {
                Message::user(&format!("Result from {}:\n{}", capability, output))
            }
        }
    }
}

/// Convert a transcript into prompt messages
pub fn to_messages(items: &[SessionItem]) -> Vec<Message> {
    items.iter().map(SessionItem::to_message).collect()
}

/// Drop tool calls and tool results, keep conversational messages
pub fn without_tool_items(items: &[SessionItem]) -> Vec<SessionItem> {
    items.iter().filter(|item| !item.is_tool_item()).cloned().collect()
}

/// Keyed conversation store
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn append(&self, key: &str, items: &[SessionItem]) -> Result<()>;

    /// All items for `key`, oldest first. Unknown keys are empty.
    async fn history(&self, key: &str) -> Result<Vec<SessionItem>>;

    async fn clear(&self, key: &str) -> Result<()>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Vec<SessionItem>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn append(&self, key: &str, items: &[SessionItem]) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.entry(key.to_string()).or_default().extend_from_slice(items);
        Ok(())
    }

    async fn history(&self, key: &str) -> Result<Vec<SessionItem>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(key).cloned().unwrap_or_default())
    }

    async fn clear(&self, key: &str) -> Result<()> {
        self.sessions.write().await.remove(key);
        Ok(())
    }
}

/// One `<key>.jsonl` file per session under a base directory
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    base_path: PathBuf,
}

impl FileSessionStore {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        tokio::fs::create_dir_all(&base_path).await.map_err(|e| {
            ResearchError::Session(format!("Failed to create {}: {}", base_path.display(), e))
        })?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Bytes outside `[A-Za-z0-9_-]` are percent-encoded, so distinct keys never share a file
    fn path_for(&self, key: &str) -> PathBuf {
        let mut file_name = String::with_capacity(key.len());
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
                file_name.push(char::from(byte));
            } else {
                file_name.push_str(&format!("%{:02X}", byte));
            }
        }
        self.base_path.join(format!("{}.jsonl", file_name))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn append(&self, key: &str, items: &[SessionItem]) -> Result<()> {
        let mut buffer = String::new();
        for item in items {
            let line = serde_json::to_string(item)
                .map_err(|e| ResearchError::Session(format!("Failed to encode item: {}", e)))?;
            buffer.push_str(&line);
            buffer.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(key))
            .await?;
        file.write_all(buffer.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn history(&self, key: &str) -> Result<Vec<SessionItem>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = tokio::fs::read_to_string(&path).await?;
        let mut items = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<SessionItem>(line) {
                Ok(item) => items.push(item),
                Err(e) => log::warn!("Skipping malformed line {} in {}: {}", idx + 1, path.display(), e),
            }
        }
        Ok(items)
    }

    async fn clear(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            tokio::fs::remove_file(&path).await?;
        }
        Ok(())
    }
}
