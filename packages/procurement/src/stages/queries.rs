//! Query recommendation: product brief in, bounded query set out.

use crate::artifacts::ArtifactStore;
use crate::deps::PipelineDeps;
use crate::error::{PipelineError, Result};
use crate::retry::RetryPolicy;
use crate::stage::Stage;
use crate::types::{Job, SearchQuerySet};

const SYSTEM_PROMPT: &str =
    "You suggest varied, specific search queries for finding products to \
     buy. Every query must lead to an e-commerce page for a single \
     product, never a blog or a listing page.";

fn build_prompt(job: &Job, company_context: &str) -> String {
    [
        company_context.to_string(),
        format!(
            "The company is looking to buy {} at the best prices (value for a price strategy).",
            job.product_name
        ),
        format!(
            "The company targets any of these websites to buy from: {}.",
            job.websites.join(", ")
        ),
        format!("The stores must sell the product in {}.", job.country),
        format!("Generate at maximum {} queries.", job.no_keywords),
        format!("The search keywords must be in {}.", job.language),
        "Search keywords must contain specific brands, types or technologies. \
         Avoid general keywords."
            .to_string(),
    ]
    .join("\n")
}

/// Run the stage: one retry-wrapped structured call, validate, persist.
///
/// The JSON parse happens inside the envelope: a malformed model payload
/// is transient and worth another attempt. A query set that parses but
/// violates its budget fails the whole stage; a partial set is not usable
/// downstream.
pub async fn run(
    job: &Job,
    deps: &PipelineDeps,
    retry: &RetryPolicy,
    artifacts: &ArtifactStore,
    company_context: &str,
) -> Result<SearchQuerySet> {
    let schema = SearchQuerySet::json_schema(job.no_keywords);
    let prompt = build_prompt(job, company_context);

    let queries = retry
        .run("query_recommendation", || {
            let schema = schema.clone();
            let prompt = prompt.clone();
            async move {
                let raw = deps
                    .model
                    .generate_structured(SYSTEM_PROMPT, &prompt, schema)
                    .await?;
                serde_json::from_str::<SearchQuerySet>(&raw).map_err(|e| {
                    PipelineError::transient_msg(format!(
                        "model returned a malformed query payload: {e}"
                    ))
                })
            }
        })
        .await?;

    queries.validate_with_budget(job.no_keywords)?;
    artifacts
        .write_stage_json(job.id, Stage::QueryRecommendation, &queries)
        .await?;

    tracing::info!(
        job_id = %job.id,
        query_count = queries.len(),
        "search queries suggested"
    );
    Ok(queries)
}
