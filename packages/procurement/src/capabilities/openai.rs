//! OpenAI-backed language model and report author.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{LanguageModel, ReportAuthor};
use crate::error::{PipelineError, Result};
use crate::types::ExtractedProductSet;

const DEFAULT_MODEL: &str = "gpt-4o";
const CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenAI chat-completions client.
///
/// Requests run with temperature 0 so repeated calls over the same input
/// stay stable. Structured calls use the `json_schema` response format.
#[derive(Clone)]
pub struct OpenAiModel {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
    json_schema: JsonSchemaFormat,
}

#[derive(Serialize)]
struct JsonSchemaFormat {
    name: &'static str,
    schema: serde_json::Value,
    strict: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OpenAiModel {
    /// Create a client with the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Set the chat model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn chat(&self, request: ChatRequest) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(CALL_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(PipelineError::transient)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::transient_msg(format!(
                "OpenAI API error {status}: {body}"
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(PipelineError::transient)?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| PipelineError::transient_msg("OpenAI response contained no choices"))
    }

    fn messages(system: &str, user: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage {
                role: "system",
                content: system.to_string(),
            },
            ChatMessage {
                role: "user",
                content: user.to_string(),
            },
        ]
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.chat(ChatRequest {
            model: self.model.clone(),
            messages: Self::messages(system, user),
            temperature: 0.0,
            response_format: None,
        })
        .await
    }

    async fn generate_structured(
        &self,
        system: &str,
        user: &str,
        schema: serde_json::Value,
    ) -> Result<String> {
        self.chat(ChatRequest {
            model: self.model.clone(),
            messages: Self::messages(system, user),
            temperature: 0.0,
            response_format: Some(ResponseFormat {
                format_type: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: "structured_output",
                    schema,
                    strict: true,
                },
            }),
        })
        .await
    }
}

/// The fixed sections every procurement report must cover, in order.
const REPORT_SECTIONS: [&str; 8] = [
    "Executive Summary: a brief overview of the procurement process and key findings",
    "Introduction: the purpose and scope of the report",
    "Methodology: how prices were gathered and compared",
    "Findings: detailed comparison of prices across websites, with tables",
    "Analysis: significant trends or observations in the findings",
    "Recommendations: procurement suggestions based on the analysis",
    "Conclusion: a summary of the report and final thoughts",
    "Appendices: raw data and supplementary materials",
];

const AUTHOR_SYSTEM_PROMPT: &str =
    "You author professional procurement reports as standalone HTML pages. \
     Use the Bootstrap CSS framework for styling. Respond with the HTML \
     document only.";

/// Renders the procurement report through any [`LanguageModel`].
pub struct LlmReportAuthor {
    model: Arc<dyn LanguageModel>,
}

impl LlmReportAuthor {
    /// Create an author on top of a language model.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    fn prompt(products: &ExtractedProductSet, company_context: &str) -> Result<String> {
        let sections = REPORT_SECTIONS
            .iter()
            .enumerate()
            .map(|(i, section)| format!("{}. {}", i + 1, section))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(format!(
            "About the company ordering this report:\n{company_context}\n\n\
             Generate a professional HTML procurement report comparing the \
             extracted products below. A null entry means extraction failed \
             for that candidate; mention it in the appendices rather than \
             inventing data.\n\n\
             The report must be structured with the following sections:\n\
             {sections}\n\n\
             Extracted products:\n{products}",
            products = serde_json::to_string_pretty(products)?,
        ))
    }
}

/// Strip a Markdown code fence if the model wrapped its HTML in one.
fn strip_code_fence(text: String) -> String {
    let trimmed = text.trim();
    if let Some(inner) = trimmed
        .strip_prefix("```html")
        .or_else(|| trimmed.strip_prefix("```"))
    {
        if let Some(body) = inner.strip_suffix("```") {
            return body.trim().to_string();
        }
    }
    text
}

#[async_trait]
impl ReportAuthor for LlmReportAuthor {
    async fn author(
        &self,
        products: &ExtractedProductSet,
        company_context: &str,
    ) -> Result<String> {
        let prompt = Self::prompt(products, company_context)?;
        let html = self.model.complete(AUTHOR_SYSTEM_PROMPT, &prompt).await?;
        Ok(strip_code_fence(html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_fence_is_stripped() {
        let fenced = "```html\n<html></html>\n```".to_string();
        assert_eq!(strip_code_fence(fenced), "<html></html>");

        let bare = "<html></html>".to_string();
        assert_eq!(strip_code_fence(bare), "<html></html>");
    }

    #[test]
    fn prompt_names_every_report_section() {
        let prompt =
            LlmReportAuthor::prompt(&ExtractedProductSet::default(), "about the company").unwrap();
        assert!(prompt.contains("Executive Summary"));
        assert!(prompt.contains("8. Appendices"));
        assert!(prompt.contains("about the company"));
    }
}
