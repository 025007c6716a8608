//! Tavily API client for web search.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::WebSearcher;
use crate::error::{PipelineError, Result};
use crate::types::SearchHit;

const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Tavily-backed web searcher.
pub struct TavilySearcher {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
    max_results: usize,
}

/// Tavily search depth.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
enum SearchDepth {
    Basic,
}

/// Tavily API request.
#[derive(Serialize)]
struct TavilyRequest {
    api_key: String,
    query: String,
    search_depth: SearchDepth,
    max_results: usize,
}

/// Tavily API response.
#[derive(Deserialize)]
struct TavilyResponse {
    results: Vec<TavilyResult>,
}

/// Individual search result from Tavily.
#[derive(Deserialize)]
struct TavilyResult {
    title: String,
    url: String,
    content: String,
    score: f64,
}

impl TavilySearcher {
    /// Create a new Tavily searcher.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: reqwest::Client::new(),
            base_url: "https://api.tavily.com".to_string(),
            max_results: 10,
        }
    }

    /// Set the per-query result limit.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl WebSearcher for TavilySearcher {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let request = TavilyRequest {
            api_key: self.api_key.clone(),
            query: query.to_string(),
            search_depth: SearchDepth::Basic,
            max_results: self.max_results,
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .timeout(CALL_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(PipelineError::transient)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::transient_msg(format!(
                "Tavily API error {status}: {body}"
            )));
        }

        let parsed: TavilyResponse = response.json().await.map_err(PipelineError::transient)?;

        Ok(parsed
            .results
            .into_iter()
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                content: r.content,
                score: r.score,
            })
            .collect())
    }
}
