//! Stage contracts: the name and artifact path of each pipeline step.

use serde::{Deserialize, Serialize};

/// The four pipeline stages, in execution order.
///
/// Each stage consumes the previous stage's validated output and persists
/// its own output under the artifact name declared here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    QueryRecommendation,
    Search,
    Extraction,
    Report,
}

impl Stage {
    /// Stage name used in logs and failure reasons.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::QueryRecommendation => "query_recommendation",
            Stage::Search => "search",
            Stage::Extraction => "extraction",
            Stage::Report => "report",
        }
    }

    /// Filename of the artifact this stage persists.
    pub fn artifact_name(&self) -> &'static str {
        match self {
            Stage::QueryRecommendation => "step_1_suggested_search_queries.json",
            Stage::Search => "step_2_search_results.json",
            Stage::Extraction => "step_3_extracted_products.json",
            Stage::Report => "procurement_report.html",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
