pub mod client;
pub mod error;
pub mod models;

// Re-exports
pub use client::{TavilyClient, TavilyConfig};
pub use error::TavilyError;
pub use models::*;
