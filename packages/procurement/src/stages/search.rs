//! Search fan-out and deterministic aggregation.

use futures::stream::{self, StreamExt};

use crate::artifacts::ArtifactStore;
use crate::deps::PipelineDeps;
use crate::error::{PipelineError, Result};
use crate::retry::RetryPolicy;
use crate::stage::Stage;
use crate::types::{Job, SearchQuerySet, SearchResult, SearchResultSet};
use crate::validate::retain_valid;

/// Run the stage: fan queries out to the search capability, aggregate
/// deterministically, validate, persist.
///
/// A failed query contributes zero results and a warning; the stage fails
/// only when every query fails or nothing survives the score threshold.
/// `buffered` keeps per-query outputs in query order, so the dedup
/// tie-break never depends on completion order.
pub async fn run(
    job: &Job,
    queries: &SearchQuerySet,
    deps: &PipelineDeps,
    retry: &RetryPolicy,
    artifacts: &ArtifactStore,
    concurrency: usize,
) -> Result<SearchResultSet> {
    let per_query: Vec<Option<Vec<SearchResult>>> = stream::iter(queries.queries.clone())
        .map(|query| async move {
            match retry
                .run("search", || async { deps.searcher.search(&query).await })
                .await
            {
                Ok(hits) => Some(
                    hits.into_iter()
                        .map(|hit| SearchResult::from_hit(hit, query.as_str()))
                        .collect::<Vec<_>>(),
                ),
                Err(error) => {
                    tracing::warn!(
                        job_id = %job.id,
                        query = %query,
                        error = %error,
                        "search query failed, contributing zero results"
                    );
                    None
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    if per_query.iter().all(Option::is_none) {
        return Err(PipelineError::stage_failure(
            Stage::Search,
            "no results: every search query failed",
        ));
    }

    let ordered: Vec<SearchResult> = per_query.into_iter().flatten().flatten().collect();
    let valid = retain_valid(ordered, "search result");
    let set = SearchResultSet::aggregate(valid, job.score_threshold);

    if set.is_empty() {
        return Err(PipelineError::stage_failure(
            Stage::Search,
            format!(
                "no search results with score >= {}",
                job.score_threshold
            ),
        ));
    }

    artifacts
        .write_stage_json(job.id, Stage::Search, &set)
        .await?;

    tracing::info!(
        job_id = %job.id,
        result_count = set.len(),
        "search results aggregated"
    );
    Ok(set)
}
