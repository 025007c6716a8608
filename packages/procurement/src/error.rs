//! Typed errors for the procurement pipeline.
//!
//! Uses `thiserror` for library errors (the server binary wraps these in
//! `anyhow`). The taxonomy mirrors how failures move through the pipeline:
//! validation failures are terminal for the offending record and never
//! retried, transient call failures are retried by the envelope, and stage
//! failures halt the orchestrator.

use std::path::PathBuf;

use thiserror::Error;

use crate::stage::Stage;

/// A field-level schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field `{field}`: {constraint}")]
pub struct ValidationError {
    /// The offending field.
    pub field: String,

    /// The violated constraint, human readable.
    pub constraint: String,
}

impl ValidationError {
    /// Create a validation error for a named field.
    pub fn new(field: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            constraint: constraint.into(),
        }
    }
}

/// Errors that can occur while running the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Payload violates a stage schema. Never retried.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// An external capability call failed (timeout, 5xx, rate limit).
    /// Retried by the envelope until the attempt budget is exhausted.
    #[error("transient call error: {0}")]
    TransientCall(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A stage could not produce usable output; the pipeline halts.
    #[error("stage `{stage}` failed: {reason}")]
    StageFailure {
        /// The stage that failed.
        stage: Stage,
        /// Why the stage has no usable output.
        reason: String,
    },

    /// A stage reported success but its artifact is not on disk.
    #[error("artifact missing at {}", path.display())]
    ArtifactMissing {
        /// Expected artifact path.
        path: PathBuf,
    },

    /// Artifact persistence failed.
    #[error("artifact I/O error: {0}")]
    Artifact(#[from] std::io::Error),

    /// Artifact serialization failed.
    #[error("artifact encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl PipelineError {
    /// Wrap an arbitrary error as a transient call failure.
    pub fn transient(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::TransientCall(Box::new(err))
    }

    /// Transient call failure from a bare message (status-code errors,
    /// malformed capability payloads).
    pub fn transient_msg(msg: impl Into<String>) -> Self {
        Self::TransientCall(msg.into().into())
    }

    /// Stage failure with a reason.
    pub fn stage_failure(stage: Stage, reason: impl Into<String>) -> Self {
        Self::StageFailure {
            stage,
            reason: reason.into(),
        }
    }

    /// Whether the retry envelope should attempt this error again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientCall(_))
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
