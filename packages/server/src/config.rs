use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub openai_api_key: String,
    pub tavily_api_key: String,
    pub scrapegraph_api_key: String,
    pub output_dir: String,
    pub about_company: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            openai_api_key: env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY must be set")?,
            tavily_api_key: env::var("TAVILY_API_KEY")
                .context("TAVILY_API_KEY must be set")?,
            scrapegraph_api_key: env::var("SCRAPEGRAPH_API_KEY")
                .context("SCRAPEGRAPH_API_KEY must be set")?,
            output_dir: env::var("OUTPUT_DIR").unwrap_or_else(|_| "./ai-agent-output".to_string()),
            about_company: env::var("ABOUT_COMPANY").ok(),
        })
    }
}
