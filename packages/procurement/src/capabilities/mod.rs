//! Capability providers: the external services the pipeline drives.
//!
//! Each provider is a black box behind a trait; the shipped clients talk
//! to OpenAI, Tavily and ScrapeGraph. Stages only ever see the traits and
//! reach them through the retry envelope, so tests substitute the mocks in
//! [`crate::testing`] without touching the network.

pub mod openai;
pub mod smartscraper;
pub mod tavily;

pub use openai::{LlmReportAuthor, OpenAiModel};
pub use smartscraper::SmartScraperClient;
pub use tavily::TavilySearcher;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ExtractedProduct, ExtractedProductSet, SearchHit};

/// Language/completion capability: prompt in, text or schema-shaped JSON
/// out.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Free-text completion.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Completion constrained to the given JSON schema. Returns the raw
    /// JSON payload; the caller parses and validates it.
    async fn generate_structured(
        &self,
        system: &str,
        user: &str,
        schema: serde_json::Value,
    ) -> Result<String>;
}

/// Search capability: query in, ranked results out.
#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Search the web for pages relevant to the query.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

/// Page-extraction capability: listing URL in, structured product record
/// out.
#[async_trait]
pub trait PageExtractor: Send + Sync {
    /// Extract a product record matching [`ExtractedProduct::json_schema`]
    /// from the page at `page_url`.
    async fn extract_product(&self, page_url: &str) -> Result<ExtractedProduct>;
}

/// Report-authoring capability: product set and company context in,
/// rendered HTML out.
#[async_trait]
pub trait ReportAuthor: Send + Sync {
    /// Render the procurement report for the extracted products.
    async fn author(
        &self,
        products: &ExtractedProductSet,
        company_context: &str,
    ) -> Result<String>;
}
