//! Procurement research pipeline.
//!
//! Given a product name, a target country and a requested result count,
//! the pipeline suggests search queries, fans them out to a search
//! capability, extracts structured product records from the candidate
//! pages and authors a comparison report. Stages run strictly in
//! sequence; every boundary is schema-validated and every external call
//! goes through a bounded-retry envelope. Each stage persists its output
//! as a job-scoped artifact for auditability.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use procurement::{
//!     ArtifactStore, Job, LlmReportAuthor, OpenAiModel, Orchestrator,
//!     PipelineConfig, PipelineDeps, SmartScraperClient, TavilySearcher,
//! };
//!
//! let model = Arc::new(OpenAiModel::new(openai_key));
//! let deps = PipelineDeps::new(
//!     model.clone(),
//!     Arc::new(TavilySearcher::new(tavily_key)),
//!     Arc::new(SmartScraperClient::new(scrapegraph_key)),
//!     Arc::new(LlmReportAuthor::new(model)),
//! );
//! let orchestrator = Orchestrator::new(
//!     deps,
//!     ArtifactStore::new("./ai-agent-output"),
//!     PipelineConfig::default(),
//! );
//!
//! let outcome = orchestrator.run(&Job::new("washing machine", "UAE", 3)).await?;
//! ```
//!
//! # Modules
//!
//! - [`types`] - data contracts between stages
//! - [`validate`] - compile-time schemas with field-level errors
//! - [`retry`] - the bounded-retry envelope
//! - [`capabilities`] - external service traits and shipped clients
//! - [`stages`] - the four stage operations
//! - [`orchestrator`] - the state machine threading stages together
//! - [`artifacts`] - job-scoped artifact persistence
//! - [`testing`] - mock capability providers

pub mod artifacts;
pub mod capabilities;
pub mod config;
pub mod deps;
pub mod error;
pub mod orchestrator;
pub mod retry;
pub mod stage;
pub mod stages;
pub mod testing;
pub mod types;
pub mod validate;

// Re-export core types at crate root
pub use artifacts::ArtifactStore;
pub use capabilities::{
    LanguageModel, LlmReportAuthor, OpenAiModel, PageExtractor, ReportAuthor,
    SmartScraperClient, TavilySearcher, WebSearcher,
};
pub use config::{PipelineConfig, DEFAULT_COMPANY_CONTEXT};
pub use deps::PipelineDeps;
pub use error::{PipelineError, Result, ValidationError};
pub use orchestrator::{Orchestrator, PipelineOutcome, PipelineState};
pub use retry::RetryPolicy;
pub use stage::Stage;
pub use types::{
    ExtractedProduct, ExtractedProductSet, Job, ProductSpec, SearchHit, SearchQuerySet,
    SearchResult, SearchResultSet, DEFAULT_NO_KEYWORDS, DEFAULT_SCORE_THRESHOLD,
    DEFAULT_WEBSITES,
};
pub use validate::Validate;
