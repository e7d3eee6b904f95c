// Deep-Research: Search Tool Family
// Five scoped web searches. Failures come back as text, never as errors.

use super::{str_arg, Capability, RunContext};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tavily::{SearchDepth, SearchRequest, SearchResponse, TavilyClient, TavilyError};

/// The external search capability
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> std::result::Result<SearchResponse, TavilyError>;
}

#[async_trait]
impl SearchBackend for TavilyClient {
    async fn search(&self, request: &SearchRequest) -> std::result::Result<SearchResponse, TavilyError> {
        TavilyClient::search(self, request).await
    }
}

const WEB_DOMAINS: &[&str] = &["*.edu", "*.gov", "*.org", "*.com"];
const ACADEMIC_DOMAINS: &[&str] = &["*.edu", "arxiv.org", "researchgate.net", "scholar.google.com"];
const MARKET_DOMAINS: &[&str] = &["*.com", "*.org", "statista.com", "ibisworld.com", "mckinsey.com"];
const FINANCIAL_DOMAINS: &[&str] = &["*.com", "crunchbase.com", "pitchbook.com", "*.gov"];

/// All five search capabilities over one backend
pub fn search_capabilities(
    backend: Arc<dyn SearchBackend>,
    default_depth: SearchDepth,
) -> Vec<Arc<dyn Capability>> {
    vec![
        Arc::new(WebSearch::new(backend.clone(), default_depth)),
        Arc::new(AcademicSearch::new(backend.clone())),
        Arc::new(MarketReportSearch::new(backend.clone())),
        Arc::new(CompetitorSearch::new(backend.clone(), default_depth)),
        Arc::new(FinancialSearch::new(backend, default_depth)),
    ]
}

/// Run one request and render either the payload or the failure
async fn run_search(
    backend: &dyn SearchBackend,
    request: SearchRequest,
    failure_label: &str,
    render: impl FnOnce(&SearchResponse) -> String,
) -> String {
    match backend.search(&request).await {
        Ok(response) => render(&response),
        Err(e) => {
            log::warn!("{} failed for '{}': {}", failure_label, request.query, e);
            format!("{} failed: {}", failure_label, e)
        }
    }
}

fn missing(failure_label: &str, arg: &str) -> String {
    format!("{} failed: missing required argument '{}'", failure_label, arg)
}

/// `search_web`: general web search
pub struct WebSearch {
    backend: Arc<dyn SearchBackend>,
    default_depth: SearchDepth,
}

impl WebSearch {
    pub fn new(backend: Arc<dyn SearchBackend>, default_depth: SearchDepth) -> Self {
        Self { backend, default_depth }
    }
}

#[async_trait]
impl Capability for WebSearch {
    fn name(&self) -> &str {
        "search_web"
    }

    fn description(&self) -> &str {
        "Search the web for current information about a topic."
    }

    fn parameters(&self) -> Value {
        json!({"query": "the search query", "search_depth": "\"basic\" or \"advanced\" (optional)"})
    }

    async fn invoke(&self, ctx: &RunContext, args: Value) -> Result<String> {
        const LABEL: &str = "Search";
        let Some(query) = str_arg(&args, "query") else {
            return Ok(missing(LABEL, "query"));
        };
        let depth = str_arg(&args, "search_depth")
            .map(|d| SearchDepth::parse_lenient(&d))
            .unwrap_or(self.default_depth);

        log::info!("Searching the web for: {}", query);
        let request = SearchRequest::new(query.as_str())
            .with_depth(depth)
            .with_domains(WEB_DOMAINS)
            .with_max_results(ctx.preferences.max_results);

        Ok(run_search(self.backend.as_ref(), request, LABEL, |response| {
            format!("Search results for '{}':\n{}", query, response)
        })
        .await)
    }
}

/// `search_academic_papers`: scholarly sources
pub struct AcademicSearch {
    backend: Arc<dyn SearchBackend>,
}

impl AcademicSearch {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Capability for AcademicSearch {
    fn name(&self) -> &str {
        "search_academic_papers"
    }

    fn description(&self) -> &str {
        "Search for academic papers and research about a topic."
    }

    fn parameters(&self) -> Value {
        json!({"topic": "the research topic"})
    }

    async fn invoke(&self, ctx: &RunContext, args: Value) -> Result<String> {
        const LABEL: &str = "Academic search";
        let Some(topic) = str_arg(&args, "topic") else {
            return Ok(missing(LABEL, "topic"));
        };

        log::info!("Searching for academic papers about: {}", topic);
        let request = SearchRequest::new(format!("academic research papers {}", topic))
            .with_depth(SearchDepth::Advanced)
            .with_domains(ACADEMIC_DOMAINS)
            .with_max_results(ctx.preferences.max_results);

        Ok(run_search(self.backend.as_ref(), request, LABEL, |response| {
            format!("Academic research results for '{}':\n{}", topic, response)
        })
        .await)
    }
}

/// `search_market_reports`: industry analysis
pub struct MarketReportSearch {
    backend: Arc<dyn SearchBackend>,
}

impl MarketReportSearch {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Capability for MarketReportSearch {
    fn name(&self) -> &str {
        "search_market_reports"
    }

    fn description(&self) -> &str {
        "Search for market reports and industry analysis."
    }

    fn parameters(&self) -> Value {
        json!({"industry": "the industry to analyze"})
    }

    async fn invoke(&self, ctx: &RunContext, args: Value) -> Result<String> {
        const LABEL: &str = "Market report search";
        let Some(industry) = str_arg(&args, "industry") else {
            return Ok(missing(LABEL, "industry"));
        };

        log::info!("Searching for market reports about: {}", industry);
        let request = SearchRequest::new(format!(
            "market report industry analysis {} 2024 2025",
            industry
        ))
        .with_depth(SearchDepth::Advanced)
        .with_domains(MARKET_DOMAINS)
        .with_max_results(ctx.preferences.max_results);

        Ok(run_search(self.backend.as_ref(), request, LABEL, |response| {
            format!("Market report results for '{}':\n{}", industry, response)
        })
        .await)
    }
}

/// `search_competitors`: similar products, no domain restriction
pub struct CompetitorSearch {
    backend: Arc<dyn SearchBackend>,
    default_depth: SearchDepth,
}

impl CompetitorSearch {
    pub fn new(backend: Arc<dyn SearchBackend>, default_depth: SearchDepth) -> Self {
        Self { backend, default_depth }
    }
}

#[async_trait]
impl Capability for CompetitorSearch {
    fn name(&self) -> &str {
        "search_competitors"
    }

    fn description(&self) -> &str {
        "Search for competitors and similar products in the market."
    }

    fn parameters(&self) -> Value {
        json!({"product_name": "the product", "industry": "its industry"})
    }

    async fn invoke(&self, ctx: &RunContext, args: Value) -> Result<String> {
        const LABEL: &str = "Competitor search";
        let Some(product_name) = str_arg(&args, "product_name") else {
            return Ok(missing(LABEL, "product_name"));
        };
        let industry = str_arg(&args, "industry").unwrap_or_default();

        log::info!("Searching for competitors about: {}", product_name);
        let query = format!("competitors similar products {} {}", product_name, industry);
        let request = SearchRequest::new(query.trim_end())
            .with_depth(self.default_depth)
            .with_max_results(ctx.preferences.max_results);

        Ok(run_search(self.backend.as_ref(), request, LABEL, |response| {
            format!("Competitor analysis results for '{}':\n{}", product_name, response)
        })
        .await)
    }
}

/// `search_financial_data`: funding and revenue figures
pub struct FinancialSearch {
    backend: Arc<dyn SearchBackend>,
    default_depth: SearchDepth,
}

impl FinancialSearch {
    pub fn new(backend: Arc<dyn SearchBackend>, default_depth: SearchDepth) -> Self {
        Self { backend, default_depth }
    }

    fn query(company_name: Option<&str>, industry: Option<&str>) -> String {
        let mut query = String::new();
        for part in [company_name, industry].into_iter().flatten() {
            query.push_str(part);
            query.push(' ');
        }
        query.push_str("funding investment financial data revenue");
        query
    }
}

#[async_trait]
impl Capability for FinancialSearch {
    fn name(&self) -> &str {
        "search_financial_data"
    }

    fn description(&self) -> &str {
        "Search for financial data, funding information, and investment trends."
    }

    fn parameters(&self) -> Value {
        json!({"company_name": "a company (optional)", "industry": "an industry (optional)"})
    }

    async fn invoke(&self, ctx: &RunContext, args: Value) -> Result<String> {
        const LABEL: &str = "Financial search";
        let company_name = str_arg(&args, "company_name");
        let industry = str_arg(&args, "industry");
        let query = Self::query(company_name.as_deref(), industry.as_deref());

        log::info!("Searching for financial data: {}", query);
        let request = SearchRequest::new(query)
            .with_depth(self.default_depth)
            .with_domains(FINANCIAL_DOMAINS)
            .with_max_results(ctx.preferences.max_results);

        Ok(run_search(self.backend.as_ref(), request, LABEL, |response| {
            format!("Financial data results: {}", response)
        })
        .await)
    }
}
