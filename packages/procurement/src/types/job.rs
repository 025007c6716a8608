//! The unit of work: one procurement-research request.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::validate::{require_min, require_non_empty, require_range, Validate};

/// Fixed allow-list used when a request does not name its own websites.
pub const DEFAULT_WEBSITES: [&str; 10] = [
    "www.amazon.com",
    "www.ebay.com",
    "www.aliexpress.com",
    "www.walmart.com",
    "www.bestbuy.com",
    "www.newegg.com",
    "www.target.com",
    "www.jumia.com",
    "www.noon.com",
    "www.etsy.com",
];

/// Default upper bound on generated search queries.
pub const DEFAULT_NO_KEYWORDS: usize = 10;

/// Default minimum relevance score for a search result to survive.
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.10;

/// One procurement-research request and the knobs for its pipeline run.
///
/// Created on submission, lives for the duration of one run; only its
/// artifacts outlive it. The id scopes every artifact path, so concurrent
/// jobs never share a directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Job id; scopes every artifact path for this run.
    pub id: Uuid,

    /// Product the company wants to buy.
    pub product_name: String,

    /// Country the stores must sell the product in.
    pub country: String,

    /// Language the search queries are generated in.
    pub language: String,

    /// Websites the company is willing to buy from.
    pub websites: Vec<String>,

    /// How many products the final report should cover.
    pub top_recommendations_no: usize,

    /// Upper bound on generated search queries.
    pub no_keywords: usize,

    /// Minimum relevance score for a search result to survive.
    pub score_threshold: f64,
}

impl Job {
    /// Create a job with the standard defaults: English queries, the
    /// ten-site allow-list, ten keywords, 0.10 score threshold.
    pub fn new(
        product_name: impl Into<String>,
        country: impl Into<String>,
        top_recommendations_no: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_name: product_name.into(),
            country: country.into(),
            language: "English".to_string(),
            websites: DEFAULT_WEBSITES.iter().map(|s| s.to_string()).collect(),
            top_recommendations_no,
            no_keywords: DEFAULT_NO_KEYWORDS,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
        }
    }

    /// Replace the website allow-list. An empty list keeps the default.
    pub fn with_websites(mut self, websites: Vec<String>) -> Self {
        if !websites.is_empty() {
            self.websites = websites;
        }
        self
    }

    /// Set the query language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the keyword budget.
    pub fn with_no_keywords(mut self, no_keywords: usize) -> Self {
        self.no_keywords = no_keywords;
        self
    }

    /// Set the relevance threshold.
    pub fn with_score_threshold(mut self, threshold: f64) -> Self {
        self.score_threshold = threshold;
        self
    }
}

impl Validate for Job {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("product_name", &self.product_name)?;
        require_non_empty("country", &self.country)?;
        require_non_empty("language", &self.language)?;
        if self.websites.is_empty() {
            return Err(ValidationError::new(
                "websites",
                "must name at least one website",
            ));
        }
        require_min("top_recommendations_no", self.top_recommendations_no, 1)?;
        require_min("no_keywords", self.no_keywords, 1)?;
        require_range("score_threshold", self.score_threshold, 0.0, 1.0)?;
        Ok(())
    }
}
