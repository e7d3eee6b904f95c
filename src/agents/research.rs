// Deep-Research: Specialist Agents
// Search, Analysis and Reports, each exposed to the orchestrator as a capability

use super::runner::AgentDefinition;
use crate::config::MAX_SEARCH_ROUNDS;
use crate::llm::{ModelProfile, SystemPrompts};
use crate::tools::{search_capabilities, SearchBackend};
use std::sync::Arc;
use tavily::SearchDepth;

pub const SEARCH_AGENT: &str = "search_agent";
pub const ANALYSIS_AGENT: &str = "analysis_agent";
pub const REPORTS_AGENT: &str = "reports_agent";

/// Web researcher with the five search capabilities
pub fn search_agent(
    backend: Arc<dyn SearchBackend>,
    default_depth: SearchDepth,
    max_rounds: usize,
) -> AgentDefinition {
    let mut agent = AgentDefinition::new(SEARCH_AGENT, SystemPrompts::search(), ModelProfile::Full)
        .with_description("A tool for searching the web.")
        .with_max_rounds(max_rounds);
    for capability in search_capabilities(backend, default_depth) {
        agent = agent.with_capability(capability);
    }
    agent
}

/// Search agent with the default round limit
pub fn default_search_agent(backend: Arc<dyn SearchBackend>, default_depth: SearchDepth) -> AgentDefinition {
    search_agent(backend, default_depth, MAX_SEARCH_ROUNDS)
}

/// Single-call analyst, no capabilities
pub fn analysis_agent() -> AgentDefinition {
    AgentDefinition::new(ANALYSIS_AGENT, SystemPrompts::analysis(), ModelProfile::Full)
        .with_description("A tool for analyzing the data.")
}

/// Single-call report writer, no capabilities
pub fn reports_agent() -> AgentDefinition {
    AgentDefinition::new(REPORTS_AGENT, SystemPrompts::reports(), ModelProfile::Full)
        .with_description("A tool for creating reports.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tavily::{SearchRequest, SearchResponse, TavilyError};

    struct Offline;

    #[async_trait]
    impl SearchBackend for Offline {
        async fn search(&self, _request: &SearchRequest) -> Result<SearchResponse, TavilyError> {
            Err(TavilyError::InvalidRequest("offline".to_string()))
        }
    }

    #[test]
    fn test_search_agent_carries_all_search_capabilities() {
        let agent = default_search_agent(Arc::new(Offline), SearchDepth::Basic);
        assert_eq!(agent.max_rounds, MAX_SEARCH_ROUNDS);
        assert_eq!(
            agent.capabilities.names(),
            vec![
                "search_web",
                "search_academic_papers",
                "search_market_reports",
                "search_competitors",
                "search_financial_data",
            ]
        );
    }

    #[test]
    fn test_analysis_and_reports_are_single_call() {
        for agent in [analysis_agent(), reports_agent()] {
            assert_eq!(agent.max_rounds, 1);
            assert!(agent.capabilities.is_empty());
        }
    }
}
