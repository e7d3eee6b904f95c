use thiserror::Error;

/// Errors returned by the Tavily client
#[derive(Debug, Error)]
pub enum TavilyError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Tavily API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode Tavily response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub type Result<T> = std::result::Result<T, TavilyError>;
