//! Product extraction fan-out with per-URL fallback records.

use futures::stream::{self, StreamExt};

use crate::artifacts::ArtifactStore;
use crate::deps::PipelineDeps;
use crate::error::{PipelineError, Result};
use crate::retry::RetryPolicy;
use crate::stage::Stage;
use crate::types::{ExtractedProduct, ExtractedProductSet, Job, SearchResultSet};

/// Run the stage: extract the top-N candidates in aggregate order.
///
/// Extraction completeness is best-effort. A URL whose call exhausts its
/// retries yields the fallback record at its position instead of failing
/// the stage; the stage fails only when no candidate extracts at all.
/// `buffered` preserves candidate order in the output set.
pub async fn run(
    job: &Job,
    results: &SearchResultSet,
    deps: &PipelineDeps,
    retry: &RetryPolicy,
    artifacts: &ArtifactStore,
    concurrency: usize,
) -> Result<ExtractedProductSet> {
    let candidates: Vec<String> = results
        .results
        .iter()
        .take(job.top_recommendations_no)
        .map(|result| result.url.clone())
        .collect();

    tracing::info!(
        job_id = %job.id,
        candidate_count = candidates.len(),
        max_concurrent = concurrency,
        "extracting products"
    );

    let products: Vec<Option<ExtractedProduct>> = stream::iter(candidates)
        .map(|url| async move {
            match retry
                .run("product_extraction", || async {
                    deps.extractor.extract_product(&url).await
                })
                .await
            {
                Ok(product) => Some(product),
                Err(error) => {
                    tracing::warn!(
                        job_id = %job.id,
                        url = %url,
                        error = %error,
                        "extraction failed, recording fallback"
                    );
                    None
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let set = ExtractedProductSet::new(products).into_validated();

    if set.extracted_count() == 0 {
        return Err(PipelineError::stage_failure(
            Stage::Extraction,
            "no product could be extracted from any candidate page",
        ));
    }

    artifacts
        .write_stage_json(job.id, Stage::Extraction, &set)
        .await?;

    tracing::info!(
        job_id = %job.id,
        extracted = set.extracted_count(),
        total = set.len(),
        "products extracted"
    );
    Ok(set)
}
