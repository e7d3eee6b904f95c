// Deep-Research: Capability Registry
// Everything an agent can call, whether a plain function or another agent

pub mod date;
pub mod search;

pub use date::TodayDate;
pub use search::{
    search_capabilities, AcademicSearch, CompetitorSearch, FinancialSearch, MarketReportSearch,
    SearchBackend, WebSearch,
};

use crate::error::Result;
use crate::models::PreferenceContext;
use crate::monitor::{NoopHooks, RunHooks};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Shared, read-only state handed to every capability invocation
#[derive(Clone)]
pub struct RunContext {
    pub preferences: Arc<PreferenceContext>,
    pub hooks: Arc<dyn RunHooks>,
}

impl RunContext {
    pub fn new(preferences: PreferenceContext, hooks: Arc<dyn RunHooks>) -> Self {
        Self {
            preferences: Arc::new(preferences),
            hooks,
        }
    }

    /// Default preferences, no observer
    pub fn detached() -> Self {
        Self::new(PreferenceContext::default(), Arc::new(NoopHooks))
    }
}

/// A named callable: `invoke(args) -> text`
#[async_trait]
pub trait Capability: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Argument names mapped to a short description
    fn parameters(&self) -> Value;

    async fn invoke(&self, ctx: &RunContext, args: Value) -> Result<String>;
}

/// The capabilities bound to one agent, in declaration order
#[derive(Clone, Default)]
pub struct CapabilityRegistry {
    capabilities: Vec<Arc<dyn Capability>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability; a later one with the same name replaces the earlier
    pub fn register(&mut self, capability: Arc<dyn Capability>) {
        self.capabilities.retain(|c| c.name() != capability.name());
        self.capabilities.push(capability);
    }

    pub fn with(mut self, capability: Arc<dyn Capability>) -> Self {
        self.register(capability);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Capability>> {
        self.capabilities.iter().find(|c| c.name() == name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.capabilities.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// One line per capability, for the system prompt
    pub fn catalogue(&self) -> String {
        self.capabilities
            .iter()
            .map(|c| format!("- `{}`: {} Input: {}", c.name(), c.description(), c.parameters()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Invoke by name. An unknown name is answered with text, not an error.
    pub async fn invoke(&self, name: &str, ctx: &RunContext, args: Value) -> Result<String> {
        match self.get(name) {
            Some(capability) => capability.invoke(ctx, args).await,
            None => {
                log::warn!("Unknown capability requested: {}", name);
                Ok(format!(
                    "Unknown capability '{}'. Available capabilities: {}",
                    name,
                    self.names().join(", ")
                ))
            }
        }
    }
}

/// Read a string argument; blank strings count as missing
pub(crate) fn str_arg(args: &Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
