//! ScrapeGraph smartscraper client for page extraction.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::PageExtractor;
use crate::error::{PipelineError, Result};
use crate::types::ExtractedProduct;

const CALL_TIMEOUT: Duration = Duration::from_secs(90);

/// ScrapeGraph AI client implementing [`PageExtractor`].
///
/// The smartscraper endpoint is handed the product JSON schema inside the
/// user prompt and returns the extracted record under `result`.
pub struct SmartScraperClient {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct SmartScraperRequest {
    website_url: String,
    user_prompt: String,
}

#[derive(Deserialize)]
struct SmartScraperResponse {
    result: serde_json::Value,
}

impl SmartScraperClient {
    /// Create a new ScrapeGraph client.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: reqwest::Client::new(),
            base_url: "https://api.scrapegraphai.com/v1".to_string(),
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl PageExtractor for SmartScraperClient {
    async fn extract_product(&self, page_url: &str) -> Result<ExtractedProduct> {
        let request = SmartScraperRequest {
            website_url: page_url.to_string(),
            user_prompt: format!(
                "Extract ```json\n{}```\nFrom the web page",
                ExtractedProduct::json_schema()
            ),
        };

        let response = self
            .client
            .post(format!("{}/smartscraper", self.base_url))
            .header("SGAI-APIKEY", &self.api_key)
            .timeout(CALL_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(PipelineError::transient)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::transient_msg(format!(
                "ScrapeGraph API error {status}: {body}"
            )));
        }

        let parsed: SmartScraperResponse =
            response.json().await.map_err(PipelineError::transient)?;

        let mut product: ExtractedProduct = serde_json::from_value(parsed.result)
            .map_err(|e| {
                PipelineError::transient_msg(format!(
                    "extractor payload does not match the product schema: {e}"
                ))
            })?;

        // The scraper does not reliably echo the page it was given.
        product.page_url = page_url.to_string();
        Ok(product)
    }
}
