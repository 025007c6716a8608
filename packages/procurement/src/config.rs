//! Pipeline tuning knobs.

use crate::retry::RetryPolicy;

/// Company context used when the caller does not provide one.
pub const DEFAULT_COMPANY_CONTEXT: &str =
    "SIA is a company that provides AI solutions to help websites refine \
     their search and recommendation systems.";

/// Tuning for pipeline runs. Stage semantics never change with these;
/// only call bounds and parallelism do.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Retry bounds applied to every external call.
    pub retry: RetryPolicy,

    /// Concurrent search queries in flight.
    pub search_concurrency: usize,

    /// Concurrent extraction calls in flight.
    pub extraction_concurrency: usize,

    /// Context about the buying company, threaded into the report prompt.
    pub company_context: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            search_concurrency: 5,
            extraction_concurrency: 5,
            company_context: DEFAULT_COMPANY_CONTEXT.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the company context.
    pub fn with_company_context(mut self, context: impl Into<String>) -> Self {
        self.company_context = context.into();
        self
    }

    /// Set both fan-out bounds at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.search_concurrency = concurrency;
        self.extraction_concurrency = concurrency;
        self
    }
}
