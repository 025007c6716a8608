//! Job submission: validate the request, run the pipeline, return the
//! report URL.

use axum::{extract::Extension, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use procurement::{Job, PipelineError, Stage};

use crate::app::AppState;

/// Job submission payload (camelCase, matching the web client).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub product_name: Option<String>,
    pub country: Option<String>,
    pub result_count: Option<usize>,
    #[serde(default)]
    pub websites: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_url: Option<String>,
}

impl SearchResponse {
    fn success(message: impl Into<String>, report_url: String) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            report_url: Some(report_url),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            report_url: None,
        }
    }
}

/// Handle a procurement research request end to end.
///
/// A request missing a required field is rejected before any stage runs.
/// A pipeline that finishes without a report on disk is reported as
/// "report not found", distinct from an internal pipeline error.
pub async fn search_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<SearchRequest>,
) -> (StatusCode, Json<SearchResponse>) {
    let (product_name, country, result_count) = match (
        request.product_name,
        request.country,
        request.result_count,
    ) {
        (Some(product), Some(country), Some(count))
            if !product.trim().is_empty() && !country.trim().is_empty() && count > 0 =>
        {
            (product, country, count)
        }
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(SearchResponse::error(
                    "productName, country and resultCount are required",
                )),
            );
        }
    };

    let mut job = Job::new(product_name, country, result_count);
    if let Some(websites) = request.websites {
        job = job.with_websites(websites);
    }

    tracing::info!(
        job_id = %job.id,
        product = %job.product_name,
        country = %job.country,
        result_count = job.top_recommendations_no,
        "procurement job accepted"
    );

    match state.orchestrator.run(&job).await {
        Ok(outcome) => {
            let report_url = format!(
                "/reports/{}/{}",
                outcome.job_id,
                Stage::Report.artifact_name()
            );
            (
                StatusCode::OK,
                Json(SearchResponse::success(
                    "Report generated successfully",
                    report_url,
                )),
            )
        }
        Err(PipelineError::ArtifactMissing { path }) => {
            tracing::error!(
                job_id = %job.id,
                path = %path.display(),
                "report artifact missing after authoring"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SearchResponse::error("Procurement report not found")),
            )
        }
        Err(PipelineError::Validation(e)) => (
            StatusCode::BAD_REQUEST,
            Json(SearchResponse::error(format!("Invalid request: {e}"))),
        ),
        Err(error) => {
            tracing::error!(job_id = %job.id, error = %error, "pipeline failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SearchResponse::error(error.to_string())),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_deserialize_as_none() {
        let request: SearchRequest = serde_json::from_str(r#"{"country": "UAE"}"#).unwrap();
        assert!(request.product_name.is_none());
        assert_eq!(request.country.as_deref(), Some("UAE"));
        assert!(request.result_count.is_none());
        assert!(request.websites.is_none());
    }

    #[test]
    fn camel_case_fields_are_accepted() {
        let request: SearchRequest = serde_json::from_str(
            r#"{"productName": "washing machine", "country": "UAE", "resultCount": 3,
                "websites": ["www.noon.com"]}"#,
        )
        .unwrap();
        assert_eq!(request.product_name.as_deref(), Some("washing machine"));
        assert_eq!(request.result_count, Some(3));
        assert_eq!(request.websites.unwrap().len(), 1);
    }
}
