//! Job-scoped artifact persistence.
//!
//! Every stage writes its validated output to disk before the next stage
//! runs, so a halted run leaves its intermediate artifacts behind for
//! inspection. Stage outputs are pretty-printed JSON documents; the report
//! is the rendered HTML itself.

use std::path::{Path, PathBuf};

use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::stage::Stage;

/// Writes stage artifacts under a job-scoped directory tree.
///
/// Layout: `<root>/jobs/<job_id>/<artifact>` for stage outputs and
/// `<root>/reports/<job_id>/procurement_report.html` for the rendered
/// report. Paths embed the job id, so concurrent jobs never share them.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `root`. Directories are created lazily on
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the static route serves reports from.
    pub fn reports_root(&self) -> PathBuf {
        self.root.join("reports")
    }

    /// Directory holding one job's stage artifacts.
    pub fn job_dir(&self, job_id: Uuid) -> PathBuf {
        self.root.join("jobs").join(job_id.to_string())
    }

    /// Path of one job's artifact for the given stage.
    pub fn stage_path(&self, job_id: Uuid, stage: Stage) -> PathBuf {
        match stage {
            Stage::Report => self.report_path(job_id),
            _ => self.job_dir(job_id).join(stage.artifact_name()),
        }
    }

    /// Path of the rendered report for one job.
    pub fn report_path(&self, job_id: Uuid) -> PathBuf {
        self.reports_root()
            .join(job_id.to_string())
            .join(Stage::Report.artifact_name())
    }

    /// Persist one stage's JSON artifact, creating the job directory on
    /// first write. Returns the artifact path.
    pub async fn write_stage_json<T: Serialize>(
        &self,
        job_id: Uuid,
        stage: Stage,
        value: &T,
    ) -> Result<PathBuf> {
        let dir = self.job_dir(job_id);
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(stage.artifact_name());
        let body = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(&path, body).await?;

        tracing::debug!(stage = %stage, path = %path.display(), "stage artifact written");
        Ok(path)
    }

    /// Persist the rendered report, overwriting any previous run's output
    /// at the same path.
    pub async fn write_report(&self, job_id: Uuid, html: &str) -> Result<PathBuf> {
        let path = self.report_path(job_id);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, html).await?;
        Ok(path)
    }

    /// Whether a path exists on disk. Used by the orchestrator for the
    /// report contract: call success is not artifact success.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SearchQuerySet;

    #[tokio::test]
    async fn stage_artifact_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let job_id = Uuid::new_v4();

        let queries = SearchQuerySet::new(vec!["samsung washer 7kg".to_string()]);
        let path = store
            .write_stage_json(job_id, Stage::QueryRecommendation, &queries)
            .await
            .unwrap();

        assert!(store.exists(&path).await);
        assert_eq!(path, store.stage_path(job_id, Stage::QueryRecommendation));

        let body = tokio::fs::read_to_string(&path).await.unwrap();
        let back: SearchQuerySet = serde_json::from_str(&body).unwrap();
        assert_eq!(back.queries, queries.queries);
    }

    #[tokio::test]
    async fn report_write_overwrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let job_id = Uuid::new_v4();

        let first = store.write_report(job_id, "<html>v1</html>").await.unwrap();
        let second = store.write_report(job_id, "<html>v2</html>").await.unwrap();
        assert_eq!(first, second);

        let body = tokio::fs::read_to_string(&second).await.unwrap();
        assert_eq!(body, "<html>v2</html>");
    }

    #[tokio::test]
    async fn jobs_do_not_share_artifact_paths() {
        let store = ArtifactStore::new("/tmp/out");
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_ne!(store.job_dir(a), store.job_dir(b));
        assert_ne!(store.report_path(a), store.report_path(b));
    }
}
