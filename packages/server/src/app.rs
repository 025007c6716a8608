//! Application setup and router construction.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use procurement::{
    ArtifactStore, LlmReportAuthor, OpenAiModel, Orchestrator, PipelineConfig, PipelineDeps,
    SmartScraperClient, TavilySearcher,
};

use crate::config::Config;
use crate::routes::{health_handler, search_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

/// Build the Axum application router.
///
/// Capability providers are constructed once here and injected into the
/// orchestrator; handlers only ever see the shared state.
pub fn build_app(config: &Config) -> Router {
    let model = Arc::new(OpenAiModel::new(config.openai_api_key.clone()));
    let deps = PipelineDeps::new(
        model.clone(),
        Arc::new(TavilySearcher::new(config.tavily_api_key.clone())),
        Arc::new(SmartScraperClient::new(config.scrapegraph_api_key.clone())),
        Arc::new(LlmReportAuthor::new(model)),
    );

    let artifacts = ArtifactStore::new(&config.output_dir);
    let reports_root = artifacts.reports_root();

    let mut pipeline_config = PipelineConfig::default();
    if let Some(about) = &config.about_company {
        pipeline_config = pipeline_config.with_company_context(about.clone());
    }

    let state = AppState {
        orchestrator: Arc::new(Orchestrator::new(deps, artifacts, pipeline_config)),
    };

    // CORS configuration - allow any origin for development
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/api/search", post(search_handler))
        .route("/health", get(health_handler))
        // Rendered reports, served read-only
        .nest_service("/reports", ServeDir::new(reports_root))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
