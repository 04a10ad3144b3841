use async_trait::async_trait;
use mcq_workshop::clients::{ChatBackend, CompletionRequest};
use mcq_workshop::models::{history_from_records, ItemRequest, ModelConfig, RunRecord, StructuredSummary};
use mcq_workshop::orchestrator::{develop_item, process_item, App, SummaryStatus};
use mcq_workshop::services::{GenerationClient, ModelHandle, ModelPool, ReportWriter, RetryPolicy, SamplingParams, SummaryExtractor};
use mcq_workshop::workflow::{ItemPipeline, RunCtx};
use mcq_workshop::{Config, LlmError};
use std::sync::Arc;
use std::time::Duration;

const SUMMARY_JSON: &str = r#"{"draft":{"version":"draft","question":"Q1","options":["A) a"],"correct_answer":"A"},"final":{"version":"final","question":"Q2","options":["A) b"],"correct_answer":"B"}}"#;

/// 出题流程中按环节回复，摘要请求时按需返回 JSON
struct ScriptedBackend {
    summary_json: bool,
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        if request.user_message.contains("extract information of the first draft") {
            return Ok(if self.summary_json {
                format!("Sure:\n```json\n{}\n```", SUMMARY_JSON)
            } else {
                "I cannot find the versions.".to_string()
            });
        }
        Ok(format!("{} says: {}", request.model, request.system_message))
    }
}

fn fast_client() -> GenerationClient {
    GenerationClient::new(RetryPolicy::new(1, Duration::ZERO), SamplingParams::default())
}

fn pool(summary_json: bool) -> Arc<ModelPool> {
    let backend = Arc::new(ScriptedBackend { summary_json });
    let pool = ModelPool::from_handles(vec![
        ModelHandle::new("model-a", backend.clone()),
        ModelHandle::new("model-b", backend),
    ])
    .unwrap();
    Arc::new(pool)
}

fn request(keywords: &str) -> ItemRequest {
    ItemRequest {
        keywords: keywords.to_string(),
        ..Default::default()
    }
}

fn files_with_prefix(dir: &std::path::Path, prefix: &str) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with(prefix))
        .count()
}

#[tokio::test]
async fn test_develop_item_without_models_returns_single_error_record() {
    let records = develop_item(&[], &request("anemia"), &Config::default()).await;

    assert_eq!(records.len(), 1);
    assert!(records[0].is_error());
    assert!(history_from_records(&records).is_empty());
}

#[tokio::test]
async fn test_develop_item_with_unusable_models_returns_single_error_record() {
    let configs = vec![
        ModelConfig::new("", "key", None),
        ModelConfig::new("gpt-4o", "", None),
        ModelConfig::new("local", "key", Some("ftp://localhost".to_string())),
    ];

    let records = develop_item(&configs, &request("anemia"), &Config::default()).await;

    assert_eq!(records.len(), 1);
    let value = serde_json::to_value(&records[0]).unwrap();
    assert!(value.get("error").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_process_item_writes_reports_and_model_summary() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = ItemPipeline::new(pool(true), fast_client());
    let extractor = SummaryExtractor::new(fast_client());
    let writer = ReportWriter::new(dir.path());
    let request = request("vitamin C deficiency");

    let outcome = process_item(&pipeline, &extractor, &writer, &request, &RunCtx::new(1, &request), true)
        .await
        .unwrap();

    assert_eq!(outcome.run.history.len(), 7);
    let html = std::fs::read_to_string(&outcome.report_path).unwrap();
    assert!(html.contains("Final Editorial Decision"));
    assert_eq!(files_with_prefix(dir.path(), "mcq_development_records_"), 1);

    let summary_path = match &outcome.summary {
        SummaryStatus::Extracted(path) => path.clone(),
        other => panic!("expected extracted summary, got {:?}", other),
    };
    assert!(!outcome.summary.extraction_failed());
    let saved = std::fs::read_to_string(summary_path).unwrap();
    assert_eq!(saved, SUMMARY_JSON);
    let summary = StructuredSummary::from_payload(&saved).unwrap();
    assert_eq!(summary.final_version.correct_answer, "B");
}

#[tokio::test]
async fn test_failed_extraction_is_reported_and_kept_apart() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = ItemPipeline::new(pool(false), fast_client());
    let extractor = SummaryExtractor::new(fast_client());
    let writer = ReportWriter::new(dir.path());
    let request = request("lead exposure");

    let outcome = process_item(&pipeline, &extractor, &writer, &request, &RunCtx::new(1, &request), true)
        .await
        .unwrap();

    assert!(outcome.summary.extraction_failed());
    let local_path = match &outcome.summary {
        SummaryStatus::LocalFallback(path) => path.clone(),
        other => panic!("expected local summary, got {:?}", other),
    };
    let name = local_path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("mcq_versions_summary_local_"));
    // 模型摘要文件不会被写出
    assert_eq!(
        files_with_prefix(dir.path(), "mcq_versions_summary_"),
        files_with_prefix(dir.path(), "mcq_versions_summary_local_")
    );

    let saved = std::fs::read_to_string(local_path).unwrap();
    let summary = StructuredSummary::from_payload(&saved).unwrap();
    let entries = outcome.run.history.entries();
    assert_eq!(summary.draft.question, entries[0].content);
    assert_eq!(summary.final_version.question, entries[5].content);
}

#[tokio::test]
async fn test_process_item_without_summary() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = ItemPipeline::new(pool(true), fast_client());
    let extractor = SummaryExtractor::new(fast_client());
    let writer = ReportWriter::new(dir.path());
    let request = request("neural tube defect");

    let outcome = process_item(&pipeline, &extractor, &writer, &request, &RunCtx::new(1, &request), false)
        .await
        .unwrap();

    assert_eq!(outcome.summary, SummaryStatus::Skipped);
    assert_eq!(files_with_prefix(dir.path(), "mcq_versions_summary_"), 0);
}

#[tokio::test]
async fn test_batch_runs_every_request() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        output_dir: dir.path().display().to_string(),
        max_concurrent_runs: 2,
        retry_max_attempts: 1,
        retry_delay_secs: 0,
        concurrent_reviews: true,
        ..Config::default()
    };
    let app = App::with_pool(config, pool(true));

    let stats = app
        .process_all(vec![request("a"), request("b"), request("c")])
        .await
        .unwrap();

    assert_eq!(stats.total, 3);
    assert_eq!(stats.success, 3);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.summary_failed, 0);
    assert_eq!(files_with_prefix(dir.path(), "mcq_development_history_"), 3);
    assert_eq!(files_with_prefix(dir.path(), "mcq_versions_summary_"), 3);
}

#[tokio::test]
async fn test_records_round_trip_through_json() {
    let pipeline = ItemPipeline::new(pool(true), fast_client());
    let request = request("scurvy");
    let run = pipeline.run(&request, &RunCtx::new(1, &request)).await;

    let records: Vec<RunRecord> = run.history.clone().into();
    let json = serde_json::to_string(&records).unwrap();
    let parsed: Vec<RunRecord> = serde_json::from_str(&json).unwrap();

    assert_eq!(history_from_records(&parsed), run.history);
}
