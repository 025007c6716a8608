//! Report authoring and artifact write.

use std::path::PathBuf;

use crate::artifacts::ArtifactStore;
use crate::deps::PipelineDeps;
use crate::error::Result;
use crate::retry::RetryPolicy;
use crate::types::{ExtractedProductSet, Job};

/// Run the stage: one retry-wrapped authoring call, then write the HTML
/// artifact at the job-scoped report path.
///
/// Re-running with the same inputs overwrites the artifact in place; the
/// earlier stage artifacts are untouched.
pub async fn run(
    job: &Job,
    products: &ExtractedProductSet,
    deps: &PipelineDeps,
    retry: &RetryPolicy,
    artifacts: &ArtifactStore,
    company_context: &str,
) -> Result<PathBuf> {
    let html = retry
        .run("report_authoring", || {
            deps.author.author(products, company_context)
        })
        .await?;

    let path = artifacts.write_report(job.id, &html).await?;

    tracing::info!(
        job_id = %job.id,
        path = %path.display(),
        "procurement report written"
    );
    Ok(path)
}
