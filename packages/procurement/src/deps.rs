//! Capability providers bundled for injection.

use std::sync::Arc;

use crate::capabilities::{LanguageModel, PageExtractor, ReportAuthor, WebSearcher};

/// The capability providers a pipeline run needs.
///
/// Constructed once at process start and passed explicitly to the
/// orchestrator and each stage, never reached as ambient global state, so
/// stages stay independently testable with substitute providers.
#[derive(Clone)]
pub struct PipelineDeps {
    /// Language/completion capability.
    pub model: Arc<dyn LanguageModel>,

    /// Search capability.
    pub searcher: Arc<dyn WebSearcher>,

    /// Page-extraction capability.
    pub extractor: Arc<dyn PageExtractor>,

    /// Report-authoring capability.
    pub author: Arc<dyn ReportAuthor>,
}

impl PipelineDeps {
    /// Bundle the four capability providers.
    pub fn new(
        model: Arc<dyn LanguageModel>,
        searcher: Arc<dyn WebSearcher>,
        extractor: Arc<dyn PageExtractor>,
        author: Arc<dyn ReportAuthor>,
    ) -> Self {
        Self {
            model,
            searcher,
            extractor,
            author,
        }
    }
}
