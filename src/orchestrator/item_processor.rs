//! 单个出题请求处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **单次出题**：`develop_item` 从模型配置开始跑完整个流程，返回对外记录
//! 2. **结果落盘**：`process_item` 在共享模型池上跑流程，写出报告并生成版本摘要
//!
//! 只有模型池无法建立时流程才会失败，此时只返回一条错误记录，历史中不写入任何内容。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::{ItemRequest, ModelConfig, RunRecord, StructuredSummary};
use crate::services::{ModelPool, ReportWriter, SummaryExtractor};
use crate::workflow::{ItemPipeline, PipelineRun, RunCtx};

/// 单次出题
///
/// 成功时返回 7 条历史记录；模型池无法建立时返回一条 `{ "error": ... }`
pub async fn develop_item(configs: &[ModelConfig], request: &ItemRequest, config: &Config) -> Vec<RunRecord> {
    let pool = match ModelPool::from_configs(configs) {
        Ok(pool) => Arc::new(pool),
        Err(e) => {
            error!("❌ 模型池初始化失败: {}", e);
            return vec![RunRecord::error(e.to_string())];
        }
    };

    let pipeline = ItemPipeline::from_config(pool, config);
    let run = pipeline.run(request, &RunCtx::new(1, request)).await;
    run.history.into()
}

/// 版本摘要的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryStatus {
    /// 未开启摘要
    Skipped,
    /// 模型抽取成功，文件内容为抽取出的 JSON 原文
    Extracted(PathBuf),
    /// 模型抽取失败，另存了从历史中直接取出的初稿和终稿
    LocalFallback(PathBuf),
    /// 模型抽取失败，历史中也找不到初稿或终稿
    Failed,
}

impl SummaryStatus {
    pub fn path(&self) -> Option<&Path> {
        match self {
            SummaryStatus::Extracted(path) | SummaryStatus::LocalFallback(path) => Some(path),
            SummaryStatus::Skipped | SummaryStatus::Failed => None,
        }
    }

    /// 模型抽取是否失败
    pub fn extraction_failed(&self) -> bool {
        matches!(self, SummaryStatus::LocalFallback(_) | SummaryStatus::Failed)
    }
}

/// 单个请求的处理结果
#[derive(Debug)]
pub struct ItemOutcome {
    pub run: PipelineRun,
    pub report_path: PathBuf,
    pub summary: SummaryStatus,
}

/// 在共享模型池上处理一个请求并写出报告
pub async fn process_item(
    pipeline: &ItemPipeline,
    extractor: &SummaryExtractor,
    writer: &ReportWriter,
    request: &ItemRequest,
    ctx: &RunCtx,
    generate_summary: bool,
) -> AppResult<ItemOutcome> {
    info!("{} 🚀 开始出题流程", ctx);

    let run = pipeline.run(request, ctx).await;

    let records: Vec<RunRecord> = run.history.clone().into();
    writer.write_history_json(&records).await?;
    let report_path = writer.write_html_report(&run.history).await?;

    let summary = if generate_summary {
        summarize(pipeline.pool(), extractor, writer, &run, request, ctx).await?
    } else {
        SummaryStatus::Skipped
    };

    info!("{} ✅ 出题流程完成，共 {} 条记录", ctx, run.history.len());

    Ok(ItemOutcome {
        run,
        report_path,
        summary,
    })
}

/// 生成并保存版本摘要
///
/// 模型抽取失败时报告失败，并把历史中的初稿和终稿另存为本地摘要
async fn summarize(
    pool: &ModelPool,
    extractor: &SummaryExtractor,
    writer: &ReportWriter,
    run: &PipelineRun,
    request: &ItemRequest,
    ctx: &RunCtx,
) -> AppResult<SummaryStatus> {
    let summarizer = request.models.summarizer.as_deref();

    if let Some(payload) = extractor.extract(&run.history, pool, summarizer).await {
        return Ok(match writer.save_json_summary(&payload.raw).await? {
            Some(path) => SummaryStatus::Extracted(path),
            None => SummaryStatus::Failed,
        });
    }

    warn!("{} ❌ 版本摘要生成失败", ctx);
    match StructuredSummary::from_history(&run.history) {
        Some(summary) => {
            let path = writer.save_local_summary(&summary).await?;
            Ok(SummaryStatus::LocalFallback(path))
        }
        None => {
            warn!("{} ⚠️ 历史记录中找不到初稿或终稿，跳过本地摘要", ctx);
            Ok(SummaryStatus::Failed)
        }
    }
}
