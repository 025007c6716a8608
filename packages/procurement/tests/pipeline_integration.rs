//! End-to-end pipeline scenarios over mock capability providers.

use std::sync::Arc;

use procurement::testing::{hit, product, MockExtractor, MockLanguageModel, MockReportAuthor, MockSearcher};
use procurement::{
    ArtifactStore, ExtractedProductSet, Job, Orchestrator, PipelineConfig, PipelineDeps,
    PipelineError, PipelineState, RetryPolicy, Stage,
};

const QUERY_PAYLOAD: &str =
    r#"{"queries": ["samsung front load washing machine 7kg", "lg inverter washing machine"]}"#;

fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, std::time::Duration::from_millis(1), 2)
}

fn deps(
    model: MockLanguageModel,
    searcher: MockSearcher,
    extractor: MockExtractor,
    author: MockReportAuthor,
) -> PipelineDeps {
    PipelineDeps::new(
        Arc::new(model),
        Arc::new(searcher),
        Arc::new(extractor),
        Arc::new(author),
    )
}

fn orchestrator(deps: PipelineDeps, root: &std::path::Path) -> Orchestrator {
    Orchestrator::new(
        deps,
        ArtifactStore::new(root),
        PipelineConfig::default().with_retry(fast_retry()),
    )
}

#[tokio::test]
async fn washing_machine_job_reaches_done_with_all_artifacts() {
    let dir = tempfile::tempdir().unwrap();

    let model = MockLanguageModel::new().with_structured(QUERY_PAYLOAD);
    let searcher = MockSearcher::new()
        .with_hits(
            "samsung front load washing machine 7kg",
            vec![
                hit("samsung 7kg", "https://www.noon.com/p/1", 0.95),
                hit("samsung 8kg", "https://www.amazon.com/p/2", 0.80),
                hit("samsung basic", "https://www.jumia.com/p/3", 0.55),
            ],
        )
        .with_hits(
            "lg inverter washing machine",
            vec![
                hit("lg inverter", "https://www.ebay.com/p/4", 0.70),
                hit("lg compact", "https://www.etsy.com/p/5", 0.40),
            ],
        );
    let extractor = MockExtractor::new()
        .with_product("https://www.noon.com/p/1", product("https://www.noon.com/p/1"))
        .with_product("https://www.amazon.com/p/2", product("https://www.amazon.com/p/2"))
        .with_product("https://www.ebay.com/p/4", product("https://www.ebay.com/p/4"));
    let author = MockReportAuthor::new().with_html("<html><body>report</body></html>");

    let job = Job::new("washing machine", "UAE", 3);
    let job_id = job.id;
    let orchestrator = orchestrator(deps(model, searcher, extractor, author), dir.path());

    let outcome = orchestrator.run(&job).await.unwrap();

    assert_eq!(outcome.state, PipelineState::Done);
    assert_eq!(outcome.products_extracted, 3);
    assert_eq!(outcome.report_path, orchestrator.report_path(job_id));

    let store = ArtifactStore::new(dir.path());
    for stage in [Stage::QueryRecommendation, Stage::Search, Stage::Extraction] {
        assert!(
            store.exists(&store.stage_path(job_id, stage)).await,
            "missing artifact for stage {stage}"
        );
    }
    assert!(store.exists(&outcome.report_path).await);

    // Top-3 selection follows aggregate order: highest score first.
    let body = tokio::fs::read_to_string(store.stage_path(job_id, Stage::Extraction))
        .await
        .unwrap();
    let set: ExtractedProductSet = serde_json::from_str(&body).unwrap();
    assert_eq!(set.len(), 3);
    let urls: Vec<&str> = set.extracted().map(|p| p.page_url.as_str()).collect();
    assert_eq!(
        urls,
        [
            "https://www.noon.com/p/1",
            "https://www.amazon.com/p/2",
            "https://www.ebay.com/p/4",
        ]
    );
}

#[tokio::test]
async fn zero_results_above_threshold_fails_before_extraction() {
    let dir = tempfile::tempdir().unwrap();

    let model = MockLanguageModel::new().with_structured(QUERY_PAYLOAD);
    let searcher = MockSearcher::new()
        .with_hits(
            "samsung front load washing machine 7kg",
            vec![hit("weak match", "https://www.noon.com/p/1", 0.05)],
        )
        .with_hits("lg inverter washing machine", vec![]);
    let extractor = MockExtractor::new();
    let author = MockReportAuthor::new();

    let extractor_probe = extractor.clone();
    let author_probe = author.clone();

    let job = Job::new("washing machine", "UAE", 3);
    let job_id = job.id;
    let orchestrator = orchestrator(deps(model, searcher, extractor, author), dir.path());

    let error = orchestrator.run(&job).await.unwrap_err();
    assert!(matches!(
        error,
        PipelineError::StageFailure {
            stage: Stage::Search,
            ..
        }
    ));

    // Extraction and report never ran; no report artifact was created.
    assert_eq!(extractor_probe.calls(), 0);
    assert_eq!(author_probe.calls(), 0);
    let store = ArtifactStore::new(dir.path());
    assert!(!store.exists(&store.report_path(job_id)).await);
}

#[tokio::test]
async fn failed_extraction_yields_fallback_record_not_stage_failure() {
    let dir = tempfile::tempdir().unwrap();

    let model = MockLanguageModel::new().with_structured(QUERY_PAYLOAD);
    let searcher = MockSearcher::new().with_hits(
        "samsung front load washing machine 7kg",
        vec![
            hit("first", "https://www.noon.com/p/1", 0.9),
            hit("second", "https://www.amazon.com/p/2", 0.8),
            hit("third", "https://www.ebay.com/p/3", 0.7),
        ],
    );
    let extractor = MockExtractor::new()
        .with_product("https://www.noon.com/p/1", product("https://www.noon.com/p/1"))
        .with_failing_url("https://www.amazon.com/p/2")
        .with_product("https://www.ebay.com/p/3", product("https://www.ebay.com/p/3"));
    let author = MockReportAuthor::new();

    let job = Job::new("washing machine", "UAE", 3);
    let job_id = job.id;
    let orchestrator = orchestrator(deps(model, searcher, extractor, author), dir.path());

    let outcome = orchestrator.run(&job).await.unwrap();
    assert_eq!(outcome.products_extracted, 2);

    let store = ArtifactStore::new(dir.path());
    let body = tokio::fs::read_to_string(store.stage_path(job_id, Stage::Extraction))
        .await
        .unwrap();
    let set: ExtractedProductSet = serde_json::from_str(&body).unwrap();

    // The failed URL keeps its position as a fallback entry.
    assert_eq!(set.len(), 3);
    assert!(set.products[0].is_some());
    assert!(set.products[1].is_none());
    assert!(set.products[2].is_some());
}

#[tokio::test]
async fn one_failed_query_is_tolerated_when_another_succeeds() {
    let dir = tempfile::tempdir().unwrap();

    let model = MockLanguageModel::new().with_structured(QUERY_PAYLOAD);
    let searcher = MockSearcher::new()
        .with_failing_query("samsung front load washing machine 7kg")
        .with_hits(
            "lg inverter washing machine",
            vec![hit("lg inverter", "https://www.ebay.com/p/4", 0.7)],
        );
    let extractor = MockExtractor::new()
        .with_product("https://www.ebay.com/p/4", product("https://www.ebay.com/p/4"));
    let author = MockReportAuthor::new();

    let job = Job::new("washing machine", "UAE", 3);
    let orchestrator = orchestrator(deps(model, searcher, extractor, author), dir.path());

    let outcome = orchestrator.run(&job).await.unwrap();
    assert_eq!(outcome.state, PipelineState::Done);
    assert_eq!(outcome.products_extracted, 1);
}

#[tokio::test]
async fn every_query_failing_fails_the_search_stage() {
    let dir = tempfile::tempdir().unwrap();

    let model = MockLanguageModel::new().with_structured(QUERY_PAYLOAD);
    let searcher = MockSearcher::new()
        .with_failing_query("samsung front load washing machine 7kg")
        .with_failing_query("lg inverter washing machine");

    let job = Job::new("washing machine", "UAE", 3);
    let orchestrator = orchestrator(
        deps(model, searcher, MockExtractor::new(), MockReportAuthor::new()),
        dir.path(),
    );

    let error = orchestrator.run(&job).await.unwrap_err();
    assert!(matches!(
        error,
        PipelineError::StageFailure {
            stage: Stage::Search,
            ..
        }
    ));
}

#[tokio::test]
async fn over_budget_query_set_fails_the_stage_without_searching() {
    let dir = tempfile::tempdir().unwrap();

    let model = MockLanguageModel::new()
        .with_structured(r#"{"queries": ["a", "b", "c"]}"#);
    let searcher = MockSearcher::new();
    let searcher_probe = searcher.clone();

    let job = Job::new("washing machine", "UAE", 3).with_no_keywords(2);
    let orchestrator = orchestrator(
        deps(model, searcher, MockExtractor::new(), MockReportAuthor::new()),
        dir.path(),
    );

    let error = orchestrator.run(&job).await.unwrap_err();
    assert!(matches!(error, PipelineError::Validation(_)));
    assert_eq!(searcher_probe.calls(), 0);
}

#[tokio::test]
async fn transient_model_failures_are_retried_to_success() {
    let dir = tempfile::tempdir().unwrap();

    let model = MockLanguageModel::new()
        .failing_times(2)
        .with_structured(QUERY_PAYLOAD);
    let searcher = MockSearcher::new().with_hits(
        "samsung front load washing machine 7kg",
        vec![hit("first", "https://www.noon.com/p/1", 0.9)],
    );
    let extractor = MockExtractor::new()
        .with_product("https://www.noon.com/p/1", product("https://www.noon.com/p/1"));

    let job = Job::new("washing machine", "UAE", 1);
    let orchestrator = orchestrator(
        deps(model, searcher, extractor, MockReportAuthor::new()),
        dir.path(),
    );

    let outcome = orchestrator.run(&job).await.unwrap();
    assert_eq!(outcome.state, PipelineState::Done);
}

#[tokio::test]
async fn rerunning_the_report_stage_overwrites_the_artifact_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    let retry = fast_retry();

    let job = Job::new("washing machine", "UAE", 1);
    let products = ExtractedProductSet::new(vec![Some(product("https://www.noon.com/p/1"))]);

    let first_deps = deps(
        MockLanguageModel::new(),
        MockSearcher::new(),
        MockExtractor::new(),
        MockReportAuthor::new().with_html("<html>first run</html>"),
    );
    let first = procurement::stages::report::run(
        &job,
        &products,
        &first_deps,
        &retry,
        &store,
        "company context",
    )
    .await
    .unwrap();

    let second_deps = deps(
        MockLanguageModel::new(),
        MockSearcher::new(),
        MockExtractor::new(),
        MockReportAuthor::new().with_html("<html>second run</html>"),
    );
    let second = procurement::stages::report::run(
        &job,
        &products,
        &second_deps,
        &retry,
        &store,
        "company context",
    )
    .await
    .unwrap();

    assert_eq!(first, second);
    let body = tokio::fs::read_to_string(&second).await.unwrap();
    assert_eq!(body, "<html>second run</html>");
}

#[tokio::test]
async fn invalid_job_is_rejected_before_any_stage_runs() {
    let dir = tempfile::tempdir().unwrap();

    let model = MockLanguageModel::new().with_structured(QUERY_PAYLOAD);
    let model_probe = model.clone();

    let job = Job::new("", "UAE", 3);
    let orchestrator = orchestrator(
        deps(model, MockSearcher::new(), MockExtractor::new(), MockReportAuthor::new()),
        dir.path(),
    );

    let error = orchestrator.run(&job).await.unwrap_err();
    assert!(matches!(error, PipelineError::Validation(_)));
    assert_eq!(model_probe.calls(), 0);
}
