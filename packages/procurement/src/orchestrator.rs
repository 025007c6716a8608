//! Strict-sequence pipeline state machine.
//!
//! Stages run in a fixed order; a stage runs only after the previous
//! stage's output has validated and persisted. Any failure moves the run
//! to `Failed` and halts; no stage runs out of order, none is skipped,
//! and prior artifacts stay on disk for inspection.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::artifacts::ArtifactStore;
use crate::config::PipelineConfig;
use crate::deps::PipelineDeps;
use crate::error::{PipelineError, Result};
use crate::stages;
use crate::types::Job;
use crate::validate::Validate;

/// Pipeline lifecycle for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Init,
    QueryRecommendation,
    Search,
    Extraction,
    Report,
    Done,
    Failed,
}

impl PipelineState {
    /// State name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Init => "init",
            PipelineState::QueryRecommendation => "query_recommendation",
            PipelineState::Search => "search",
            PipelineState::Extraction => "extraction",
            PipelineState::Report => "report",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a run that reached `Done`.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    /// The job this outcome belongs to.
    pub job_id: Uuid,

    /// Final state; always `Done` for a returned outcome.
    pub state: PipelineState,

    /// Path of the rendered report artifact.
    pub report_path: PathBuf,

    /// How many products extracted successfully.
    pub products_extracted: usize,

    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

/// Runs the four stages in sequence over injected capability providers.
pub struct Orchestrator {
    deps: PipelineDeps,
    artifacts: ArtifactStore,
    config: PipelineConfig,
}

impl Orchestrator {
    /// Create an orchestrator over the given providers and artifact store.
    pub fn new(deps: PipelineDeps, artifacts: ArtifactStore, config: PipelineConfig) -> Self {
        Self {
            deps,
            artifacts,
            config,
        }
    }

    /// Report path a job will produce; callers use it to build URLs.
    pub fn report_path(&self, job_id: Uuid) -> PathBuf {
        self.artifacts.report_path(job_id)
    }

    /// Run one job through the pipeline.
    ///
    /// Returns the outcome when the run reaches `Done`; otherwise the
    /// error that moved the run to `Failed`. Artifacts written before the
    /// failure are left in place.
    pub async fn run(&self, job: &Job) -> Result<PipelineOutcome> {
        let mut state = PipelineState::Init;
        let result = self.run_to_done(job, &mut state).await;

        if let Err(error) = &result {
            tracing::error!(
                job_id = %job.id,
                from = state.as_str(),
                to = PipelineState::Failed.as_str(),
                error = %error,
                "pipeline halted"
            );
        }
        result
    }

    async fn run_to_done(
        &self,
        job: &Job,
        state: &mut PipelineState,
    ) -> Result<PipelineOutcome> {
        // Malformed job input fails before any stage runs.
        job.validate()?;

        *state = self.transition(job, *state, PipelineState::QueryRecommendation);
        let queries = stages::queries::run(
            job,
            &self.deps,
            &self.config.retry,
            &self.artifacts,
            &self.config.company_context,
        )
        .await?;

        *state = self.transition(job, *state, PipelineState::Search);
        let results = stages::search::run(
            job,
            &queries,
            &self.deps,
            &self.config.retry,
            &self.artifacts,
            self.config.search_concurrency,
        )
        .await?;

        *state = self.transition(job, *state, PipelineState::Extraction);
        let products = stages::extract::run(
            job,
            &results,
            &self.deps,
            &self.config.retry,
            &self.artifacts,
            self.config.extraction_concurrency,
        )
        .await?;

        *state = self.transition(job, *state, PipelineState::Report);
        let report_path = stages::report::run(
            job,
            &products,
            &self.deps,
            &self.config.retry,
            &self.artifacts,
            &self.config.company_context,
        )
        .await?;

        // The authoring call reporting success is not enough; the artifact
        // itself must be on disk before the run may finish.
        if !self.artifacts.exists(&report_path).await {
            return Err(PipelineError::ArtifactMissing { path: report_path });
        }

        *state = self.transition(job, *state, PipelineState::Done);
        Ok(PipelineOutcome {
            job_id: job.id,
            state: PipelineState::Done,
            report_path,
            products_extracted: products.extracted_count(),
            finished_at: Utc::now(),
        })
    }

    fn transition(&self, job: &Job, from: PipelineState, to: PipelineState) -> PipelineState {
        tracing::info!(
            job_id = %job.id,
            from = from.as_str(),
            to = to.as_str(),
            "pipeline transition"
        );
        to
    }
}
