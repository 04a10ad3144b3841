//! 批量出题处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量出题请求的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：加载模型配置、建立模型池
//! 2. **批量加载**：加载所有出题请求（`Vec<ItemRequest>`）
//! 3. **并发控制**：使用 Semaphore 限制同时运行的流程数量
//! 4. **资源共享**：模型池构建后只读，所有流程共享同一个 `Arc<ModelPool>`
//! 5. **全局统计**：汇总所有流程的处理结果
//!
//! 每个流程持有自己的历史记录，流程之间不共享可变状态。

use crate::config::Config;
use crate::models::{load_item_requests, load_model_configs, ItemRequest};
use crate::orchestrator::item_processor;
use crate::services::{ModelPool, ReportWriter, SummaryExtractor};
use crate::utils::logging;
use crate::workflow::{ItemPipeline, RunCtx};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    pipeline: Arc<ItemPipeline>,
    extractor: SummaryExtractor,
    writer: ReportWriter,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let model_configs = load_model_configs(&config.models_file)
            .await
            .context("模型配置加载失败")?;
        let pool = ModelPool::from_configs(&model_configs).context("模型池初始化失败")?;

        logging::log_startup(pool.len(), config.max_concurrent_runs);
        info!("🤖 可用模型: {}", pool.names().join(", "));

        Ok(Self::with_pool(config, Arc::new(pool)))
    }

    /// 使用已建立的模型池创建应用
    pub fn with_pool(config: Config, pool: Arc<ModelPool>) -> Self {
        let pipeline = ItemPipeline::from_config(pool, &config);
        let extractor = SummaryExtractor::new(pipeline.client().clone());
        let writer = ReportWriter::new(&config.output_dir);

        Self {
            config,
            pipeline: Arc::new(pipeline),
            extractor,
            writer,
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let requests = self.load_requests().await?;

        if requests.is_empty() {
            warn!("⚠️ 没有找到出题请求，程序结束");
            return Ok(());
        }

        logging::log_requests_loaded(requests.len(), self.config.max_concurrent_runs);

        let stats = self.process_all(requests).await?;

        logging::print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            &self.config.output_dir,
        );
        if stats.summary_failed > 0 {
            warn!("⚠️ {} 个流程的版本摘要生成失败", stats.summary_failed);
        }

        Ok(())
    }

    /// 加载出题请求
    async fn load_requests(&self) -> Result<Vec<ItemRequest>> {
        info!("\n📁 正在加载出题请求...");
        let requests = load_item_requests(&self.config.requests_file)
            .await
            .context("出题请求加载失败")?;
        Ok(requests)
    }

    /// 并发处理全部请求
    pub async fn process_all(&self, requests: Vec<ItemRequest>) -> Result<ProcessingStats> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_runs.max(1)));
        let mut handles = Vec::with_capacity(requests.len());
        let mut stats = ProcessingStats {
            total: requests.len(),
            ..Default::default()
        };

        for (idx, request) in requests.into_iter().enumerate() {
            let run_index = idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            let pipeline = Arc::clone(&self.pipeline);
            let extractor = self.extractor.clone();
            let writer = self.writer.for_run(run_index);
            let generate_summary = self.config.generate_summary;

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let ctx = RunCtx::new(run_index, &request);
                let result = item_processor::process_item(
                    &pipeline,
                    &extractor,
                    &writer,
                    &request,
                    &ctx,
                    generate_summary,
                )
                .await;

                if let Err(e) = &result {
                    error!("{} ❌ 处理过程中发生错误: {}", ctx, e);
                }
                result
            });
            handles.push((run_index, handle));
        }

        for (run_index, handle) in handles {
            match handle.await {
                Ok(Ok(outcome)) => {
                    stats.success += 1;
                    if outcome.summary.extraction_failed() {
                        stats.summary_failed += 1;
                    }
                }
                Ok(Err(_)) => stats.failed += 1,
                Err(e) => {
                    error!("[流程 #{}] 任务执行失败: {}", run_index, e);
                    stats.failed += 1;
                }
            }
        }

        Ok(stats)
    }
}

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
    /// 模型摘要抽取失败的流程数
    pub summary_failed: usize,
}
