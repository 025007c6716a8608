//! Search queries and search results.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validate::{require_len, require_non_empty, require_range, Validate};

/// Ordered set of suggested search queries, produced once per job and
/// immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuerySet {
    /// Query strings, in recommendation order.
    pub queries: Vec<String>,
}

impl SearchQuerySet {
    /// Create a query set.
    pub fn new(queries: Vec<String>) -> Self {
        Self { queries }
    }

    /// Number of queries.
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Validate against the job's keyword budget. Any violation fails the
    /// whole stage; a partial query set is not usable downstream.
    pub fn validate_with_budget(&self, max_queries: usize) -> Result<(), ValidationError> {
        require_len("queries", self.queries.len(), 1, max_queries)?;
        for query in &self.queries {
            require_non_empty("queries", query)?;
        }
        Ok(())
    }

    /// JSON schema handed to the language model for structured output.
    pub fn json_schema(max_queries: usize) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "queries": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": 1,
                    "maxItems": max_queries,
                    "description": "Suggested search queries, most promising first",
                }
            },
            "required": ["queries"],
            "additionalProperties": false,
        })
    }
}

/// A single hit returned by the search capability, before it is tied to
/// the query that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Page title.
    pub title: String,

    /// Page URL.
    pub url: String,

    /// Content snippet.
    pub content: String,

    /// Relevance score in `[0, 1]`.
    pub score: f64,
}

/// A search hit tagged with its originating query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Page title.
    pub title: String,

    /// Page URL; unique key within a result set.
    pub url: String,

    /// Content snippet.
    pub content: String,

    /// Relevance score in `[0, 1]`.
    pub score: f64,

    /// The query that produced this hit.
    pub search_query: String,
}

impl SearchResult {
    /// Tag a capability hit with its originating query.
    pub fn from_hit(hit: SearchHit, search_query: impl Into<String>) -> Self {
        Self {
            title: hit.title,
            url: hit.url,
            content: hit.content,
            score: hit.score,
            search_query: search_query.into(),
        }
    }
}

impl Validate for SearchResult {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("title", &self.title)?;
        require_non_empty("url", &self.url)?;
        if url::Url::parse(&self.url).is_err() {
            return Err(ValidationError::new("url", "must be a valid URL"));
        }
        require_range("score", self.score, 0.0, 1.0)?;
        require_non_empty("search_query", &self.search_query)?;
        Ok(())
    }
}

/// Deduplicated union of results across all queries, best score first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResultSet {
    /// Aggregated results, highest score first.
    pub results: Vec<SearchResult>,
}

impl SearchResultSet {
    /// Aggregate query-ordered results into one deduplicated set.
    ///
    /// Results below `score_threshold` are dropped. Duplicate URLs keep the
    /// strictly higher-scoring occurrence; on a tie the occurrence from the
    /// earliest query wins. The final order is highest score first; the sort
    /// is stable, so equal scores stay in query order.
    pub fn aggregate(
        ordered: impl IntoIterator<Item = SearchResult>,
        score_threshold: f64,
    ) -> Self {
        let mut by_url: IndexMap<String, SearchResult> = IndexMap::new();
        for result in ordered {
            if result.score < score_threshold {
                continue;
            }
            match by_url.get(&result.url) {
                Some(existing) if existing.score >= result.score => {}
                _ => {
                    by_url.insert(result.url.clone(), result);
                }
            }
        }

        let mut results: Vec<SearchResult> = by_url.into_values().collect();
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self { results }
    }

    /// Number of aggregated results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
