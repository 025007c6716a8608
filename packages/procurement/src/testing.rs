//! Mock capability providers for tests.
//!
//! Deterministic, configurable stand-ins for the external services, with
//! call counters for asserting fan-out and retry behavior. Useful for
//! testing pipeline logic without making real network calls.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::capabilities::{LanguageModel, PageExtractor, ReportAuthor, WebSearcher};
use crate::error::{PipelineError, Result};
use crate::types::{ExtractedProduct, ExtractedProductSet, ProductSpec, SearchHit};

fn take_failure(budget: &AtomicUsize) -> bool {
    budget
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

/// Convenience constructor for a search hit.
pub fn hit(title: &str, url: &str, score: f64) -> SearchHit {
    SearchHit {
        title: title.to_string(),
        url: url.to_string(),
        content: format!("snippet for {title}"),
        score,
    }
}

/// Convenience constructor for a plausible extracted product.
pub fn product(page_url: &str) -> ExtractedProduct {
    ExtractedProduct {
        page_url: page_url.to_string(),
        title: format!("product at {page_url}"),
        image_url: format!("{page_url}/image.jpg"),
        product_url: page_url.to_string(),
        current_price: 999.0,
        original_price: None,
        discount_percentage: None,
        specs: vec![ProductSpec {
            name: "capacity".to_string(),
            value: "7 kg".to_string(),
        }],
        recommendation_rank: 4,
        recommendation_notes: vec!["good value for the price".to_string()],
    }
}

/// Mock language model returning queued structured payloads.
#[derive(Clone, Default)]
pub struct MockLanguageModel {
    structured: Arc<RwLock<Vec<String>>>,
    completion: Arc<RwLock<Option<String>>>,
    fail_first: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl MockLanguageModel {
    /// Create a mock with no scripted payloads.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a structured-output payload (FIFO across calls).
    pub fn with_structured(self, payload: impl Into<String>) -> Self {
        self.structured.write().unwrap().push(payload.into());
        self
    }

    /// Set the free-text completion payload.
    pub fn with_completion(self, text: impl Into<String>) -> Self {
        *self.completion.write().unwrap() = Some(text.into());
        self
    }

    /// Fail the first `n` calls with a transient error.
    pub fn failing_times(self, n: usize) -> Self {
        self.fail_first.store(n, Ordering::SeqCst);
        self
    }

    /// How many calls the mock has received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.fail_first) {
            return Err(PipelineError::transient_msg("mock model failure"));
        }
        Ok(self
            .completion
            .read()
            .unwrap()
            .clone()
            .unwrap_or_else(|| "<html><body>mock completion</body></html>".to_string()))
    }

    async fn generate_structured(
        &self,
        _system: &str,
        _user: &str,
        _schema: serde_json::Value,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.fail_first) {
            return Err(PipelineError::transient_msg("mock model failure"));
        }
        let mut queue = self.structured.write().unwrap();
        if queue.is_empty() {
            return Err(PipelineError::transient_msg(
                "mock model has no scripted structured payload",
            ));
        }
        Ok(queue.remove(0))
    }
}

/// Mock searcher with per-query hits and scripted failures.
#[derive(Clone, Default)]
pub struct MockSearcher {
    hits: Arc<RwLock<HashMap<String, Vec<SearchHit>>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    calls: Arc<AtomicUsize>,
}

impl MockSearcher {
    /// Create a mock returning no hits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add hits for a query.
    pub fn with_hits(self, query: impl Into<String>, hits: Vec<SearchHit>) -> Self {
        self.hits.write().unwrap().insert(query.into(), hits);
        self
    }

    /// Make a query fail with a transient error.
    pub fn with_failing_query(self, query: impl Into<String>) -> Self {
        self.failing.write().unwrap().insert(query.into());
        self
    }

    /// How many search calls the mock has received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebSearcher for MockSearcher {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.read().unwrap().contains(query) {
            return Err(PipelineError::transient_msg(format!(
                "mock search failure for `{query}`"
            )));
        }
        Ok(self
            .hits
            .read()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default())
    }
}

/// Mock extractor with per-URL products and scripted failures.
#[derive(Clone, Default)]
pub struct MockExtractor {
    products: Arc<RwLock<HashMap<String, ExtractedProduct>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    calls: Arc<AtomicUsize>,
}

impl MockExtractor {
    /// Create a mock with no scripted products.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product for a URL.
    pub fn with_product(self, url: impl Into<String>, product: ExtractedProduct) -> Self {
        self.products.write().unwrap().insert(url.into(), product);
        self
    }

    /// Make a URL fail with a transient error.
    pub fn with_failing_url(self, url: impl Into<String>) -> Self {
        self.failing.write().unwrap().insert(url.into());
        self
    }

    /// How many extraction calls the mock has received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageExtractor for MockExtractor {
    async fn extract_product(&self, page_url: &str) -> Result<ExtractedProduct> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.read().unwrap().contains(page_url) {
            return Err(PipelineError::transient_msg(format!(
                "mock extraction failure for `{page_url}`"
            )));
        }
        self.products
            .read()
            .unwrap()
            .get(page_url)
            .cloned()
            .ok_or_else(|| {
                PipelineError::transient_msg(format!("no scripted product for `{page_url}`"))
            })
    }
}

/// Mock report author returning fixed HTML.
#[derive(Clone, Default)]
pub struct MockReportAuthor {
    html: Arc<RwLock<Option<String>>>,
    fail_first: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl MockReportAuthor {
    /// Create a mock returning a placeholder report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTML the mock renders.
    pub fn with_html(self, html: impl Into<String>) -> Self {
        *self.html.write().unwrap() = Some(html.into());
        self
    }

    /// Fail the first `n` calls with a transient error.
    pub fn failing_times(self, n: usize) -> Self {
        self.fail_first.store(n, Ordering::SeqCst);
        self
    }

    /// How many authoring calls the mock has received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportAuthor for MockReportAuthor {
    async fn author(
        &self,
        _products: &ExtractedProductSet,
        _company_context: &str,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.fail_first) {
            return Err(PipelineError::transient_msg("mock author failure"));
        }
        Ok(self
            .html
            .read()
            .unwrap()
            .clone()
            .unwrap_or_else(|| "<html><body>procurement report</body></html>".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn searcher_returns_scripted_hits_and_failures() {
        let searcher = MockSearcher::new()
            .with_hits("washer", vec![hit("a", "https://a.com", 0.9)])
            .with_failing_query("dryer");

        assert_eq!(searcher.search("washer").await.unwrap().len(), 1);
        assert!(searcher.search("dryer").await.is_err());
        assert!(searcher.search("unknown").await.unwrap().is_empty());
        assert_eq!(searcher.calls(), 3);
    }

    #[tokio::test]
    async fn model_failure_budget_is_consumed_in_order() {
        let model = MockLanguageModel::new()
            .with_structured(r#"{"queries": ["q"]}"#)
            .failing_times(1);

        assert!(model
            .generate_structured("s", "u", serde_json::json!({}))
            .await
            .is_err());
        assert!(model
            .generate_structured("s", "u", serde_json::json!({}))
            .await
            .is_ok());
        assert_eq!(model.calls(), 2);
    }
}
