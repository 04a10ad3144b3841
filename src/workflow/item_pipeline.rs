//! 出题流程 - 流程层
//!
//! 核心职责：定义"一道题"从起草到定稿的完整流程
//!
//! 流程顺序（每一步写入一条历史记录，版本号 1..7）：
//! 1. 出题人起草
//! 2. 三位审稿人各自审稿（基于起草后的同一份历史快照，互相看不到对方的意见）
//! 3. 编辑部汇总
//! 4. 作者修订（沿用第 1 步的出题模型）
//! 5. 最终编辑决定（沿用第 3 步的编辑模型）
//!
//! 任何一步生成失败都不会中断流程：错误文本照常写入历史，后续环节把它当作上下文。

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info};

use crate::config::Config;
use crate::models::{HistoryLog, ItemRequest};
use crate::services::{GenerationClient, ModelHandle, ModelPool};
use crate::utils::truncate_text;
use crate::workflow::prompts;
use crate::workflow::run_ctx::RunCtx;
use crate::workflow::stage::Stage;

/// 审稿执行方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewMode {
    /// 依次执行
    #[default]
    Sequential,
    /// 并发执行
    Concurrent,
}

/// 本次流程中各角色使用的模型
#[derive(Debug, Clone)]
pub struct Cast {
    pub writer: Arc<ModelHandle>,
    pub reviewers: Vec<Arc<ModelHandle>>,
    pub editor: Arc<ModelHandle>,
}

/// 一次完整流程的结果
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub history: HistoryLog,
    pub cast: Cast,
}

/// 出题流程
///
/// - 编排固定顺序的角色
/// - 每一步的提示词 = 固定指令 + 当时的完整历史
/// - 只依赖业务能力（模型池、生成客户端）
pub struct ItemPipeline {
    pool: Arc<ModelPool>,
    client: GenerationClient,
    review_mode: ReviewMode,
}

impl ItemPipeline {
    pub fn new(pool: Arc<ModelPool>, client: GenerationClient) -> Self {
        Self {
            pool,
            client,
            review_mode: ReviewMode::default(),
        }
    }

    /// 按程序配置创建（重试策略、采样参数、审稿方式）
    pub fn from_config(pool: Arc<ModelPool>, config: &Config) -> Self {
        let review_mode = if config.concurrent_reviews {
            ReviewMode::Concurrent
        } else {
            ReviewMode::Sequential
        };
        Self::new(
            pool,
            GenerationClient::new(config.retry_policy(), config.sampling_params()),
        )
        .with_review_mode(review_mode)
    }

    pub fn with_review_mode(mut self, review_mode: ReviewMode) -> Self {
        self.review_mode = review_mode;
        self
    }

    pub fn pool(&self) -> &Arc<ModelPool> {
        &self.pool
    }

    pub fn client(&self) -> &GenerationClient {
        &self.client
    }

    pub async fn run(&self, request: &ItemRequest, ctx: &RunCtx) -> PipelineRun {
        let overrides = &request.models;
        let mut history = HistoryLog::new();

        // ========== 1: 出题人起草 ==========
        let writer = self.pool.select(Stage::Writer.role_hint(), overrides.writer.as_deref());
        info!("{} ✍️ 出题人起草 (模型: {})", ctx, writer.name());
        let draft = self
            .generate(&writer, Stage::Writer, &prompts::writer_prompt(request))
            .await;
        self.record(&mut history, Stage::Writer, draft, ctx);

        // ========== 2: 审稿 ==========
        let reviewers: Vec<Arc<ModelHandle>> = Stage::reviewers()
            .enumerate()
            .map(|(slot, stage)| self.pool.select(stage.role_hint(), overrides.reviewer(slot)))
            .collect();
        let snapshot = history.render_as_text();
        let reviews = self.review(&reviewers, &snapshot, ctx).await;
        for (stage, review) in Stage::reviewers().zip(reviews) {
            self.record(&mut history, stage, review, ctx);
        }

        // ========== 3: 编辑部汇总 ==========
        let editor = self.pool.select(Stage::Editorial.role_hint(), overrides.editor.as_deref());
        info!("{} 📝 编辑部汇总审稿意见 (模型: {})", ctx, editor.name());
        let synthesis = self
            .generate(
                &editor,
                Stage::Editorial,
                &prompts::editorial_prompt(&history.render_as_text()),
            )
            .await;
        self.record(&mut history, Stage::Editorial, synthesis, ctx);

        // ========== 4: 作者修订 ==========
        info!("{} 🔁 作者修订 (模型: {})", ctx, writer.name());
        let revision = self
            .generate(
                &writer,
                Stage::AuthorRevision,
                &prompts::revision_prompt(&history.render_as_text()),
            )
            .await;
        self.record(&mut history, Stage::AuthorRevision, revision, ctx);

        // ========== 5: 最终决定 ==========
        info!("{} ⚖️ 最终编辑决定 (模型: {})", ctx, editor.name());
        let decision = self
            .generate(
                &editor,
                Stage::FinalDecision,
                &prompts::decision_prompt(&history.render_as_text()),
            )
            .await;
        self.record(&mut history, Stage::FinalDecision, decision, ctx);

        PipelineRun {
            history,
            cast: Cast {
                writer,
                reviewers,
                editor,
            },
        }
    }

    /// 三位审稿人基于同一份快照审稿，结果按审稿人序号返回
    async fn review(&self, reviewers: &[Arc<ModelHandle>], snapshot: &str, ctx: &RunCtx) -> Vec<String> {
        let jobs: Vec<(Stage, &Arc<ModelHandle>, String)> = Stage::reviewers()
            .zip(reviewers)
            .enumerate()
            .map(|(slot, (stage, handle))| (stage, handle, prompts::reviewer_prompt(slot, snapshot)))
            .collect();

        match self.review_mode {
            ReviewMode::Sequential => {
                let mut reviews = Vec::with_capacity(jobs.len());
                for (stage, handle, prompt) in &jobs {
                    info!("{} 🔍 {} 审稿 (模型: {})", ctx, stage, handle.name());
                    reviews.push(self.generate(handle, *stage, prompt).await);
                }
                reviews
            }
            ReviewMode::Concurrent => {
                info!("{} 🔍 {} 位审稿人并发审稿", ctx, jobs.len());
                join_all(
                    jobs.iter()
                        .map(|(stage, handle, prompt)| self.generate(handle, *stage, prompt)),
                )
                .await
            }
        }
    }

    async fn generate(&self, handle: &ModelHandle, stage: Stage, user_message: &str) -> String {
        debug!("{} 提示词长度: {} 字符", stage, user_message.len());
        self.client
            .complete(handle, prompts::system_message(stage), user_message)
            .await
    }

    fn record(&self, history: &mut HistoryLog, stage: Stage, content: String, ctx: &RunCtx) {
        info!(
            "{} ✓ {} (Version {}): {}",
            ctx,
            stage,
            stage.version(),
            truncate_text(&content, 60)
        );
        history.append(stage.label(), content, stage.version());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{ChatBackend, CompletionRequest};
    use crate::error::LlmError;
    use crate::services::{failure_text, RetryPolicy, SamplingParams};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// 按名称回显的后端，记录每次调用的 (system, user)
    struct EchoBackend {
        name: &'static str,
        counter: AtomicUsize,
        calls: Mutex<Vec<(String, String)>>,
        fail_system: Option<&'static str>,
    }

    impl EchoBackend {
        fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                counter: AtomicUsize::new(0),
                calls: Mutex::new(Vec::new()),
                fail_system: None,
            })
        }

        fn failing_on(name: &'static str, system: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                counter: AtomicUsize::new(0),
                calls: Mutex::new(Vec::new()),
                fail_system: Some(system),
            })
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatBackend for EchoBackend {
        async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
            self.calls
                .lock()
                .unwrap()
                .push((request.system_message.to_string(), request.user_message.to_string()));
            if self.fail_system.is_some_and(|s| s == request.system_message) {
                return Err(LlmError::EmptyResponse {
                    model: request.model.to_string(),
                });
            }
            let n = self.counter.fetch_add(1, Ordering::SeqCst);
            Ok(format!("[{} #{}]", self.name, n))
        }
    }

    fn client() -> GenerationClient {
        GenerationClient::new(RetryPolicy::new(2, Duration::ZERO), SamplingParams::default())
    }

    fn pipeline(backends: &[Arc<EchoBackend>], mode: ReviewMode) -> ItemPipeline {
        let handles = backends
            .iter()
            .map(|b| ModelHandle::new(b.name, b.clone()))
            .collect();
        let pool = ModelPool::from_handles(handles).unwrap();
        ItemPipeline::new(Arc::new(pool), client()).with_review_mode(mode)
    }

    fn request() -> ItemRequest {
        ItemRequest {
            keywords: "folate deficiency".to_string(),
            ..Default::default()
        }
    }

    fn reviewer_prompts(backend: &EchoBackend) -> Vec<String> {
        let reviewer_system = prompts::system_message(Stage::Reviewer(1));
        backend
            .calls()
            .into_iter()
            .filter(|(system, _)| system == reviewer_system)
            .map(|(_, user)| user)
            .collect()
    }

    #[tokio::test]
    async fn test_run_produces_seven_versioned_entries() {
        let backend = EchoBackend::new("solo");
        let pipeline = pipeline(&[backend.clone()], ReviewMode::Sequential);

        let run = pipeline.run(&request(), &RunCtx::new(1, &request())).await;
        let entries = run.history.entries();

        assert_eq!(entries.len(), 7);
        let roles: Vec<&str> = entries.iter().map(|e| e.role.as_str()).collect();
        assert_eq!(
            roles,
            [
                "Item Writer",
                "Reviewer 1",
                "Reviewer 2",
                "Reviewer 3",
                "Editorial Staff",
                "Author Revision",
                "Final Editorial Decision"
            ]
        );
        let versions: Vec<u32> = entries.iter().map(|e| e.version).collect();
        assert_eq!(versions, [1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(backend.calls().len(), 7);
    }

    #[tokio::test]
    async fn test_sequential_reviewers_share_post_writer_snapshot() {
        let backend = EchoBackend::new("solo");
        let pipeline = pipeline(&[backend.clone()], ReviewMode::Sequential);

        let run = pipeline.run(&request(), &RunCtx::new(1, &request())).await;
        let entries = run.history.entries();
        let prompts = reviewer_prompts(&backend);

        assert_eq!(prompts.len(), 3);
        for prompt in &prompts {
            assert!(prompt.contains(&entries[0].content));
            for review in &entries[1..4] {
                assert!(!prompt.contains(&review.content));
            }
        }
    }

    #[tokio::test]
    async fn test_concurrent_reviewers_share_post_writer_snapshot() {
        let backend = EchoBackend::new("solo");
        let pipeline = pipeline(&[backend.clone()], ReviewMode::Concurrent);

        let run = pipeline.run(&request(), &RunCtx::new(1, &request())).await;
        let entries = run.history.entries();
        assert_eq!(entries.len(), 7);

        for prompt in reviewer_prompts(&backend) {
            for review in &entries[1..4] {
                assert!(!prompt.contains(&review.content));
            }
        }
        assert_eq!(entries[1].role, "Reviewer 1");
        assert_eq!(entries[3].role, "Reviewer 3");
    }

    #[tokio::test]
    async fn test_editorial_step_sees_all_reviews() {
        let backend = EchoBackend::new("solo");
        let pipeline = pipeline(&[backend.clone()], ReviewMode::Sequential);

        let run = pipeline.run(&request(), &RunCtx::new(1, &request())).await;
        let entries = run.history.entries();
        let editorial_system = prompts::system_message(Stage::Editorial);
        let (_, editorial_prompt) = backend
            .calls()
            .into_iter()
            .find(|(system, _)| system == editorial_system)
            .unwrap();

        for review in &entries[1..4] {
            assert!(editorial_prompt.contains(&review.content));
        }
    }

    #[tokio::test]
    async fn test_revision_and_decision_reuse_writer_and_editor() {
        let backends = [EchoBackend::new("alpha"), EchoBackend::new("beta"), EchoBackend::new("gamma")];
        let pipeline = pipeline(&backends, ReviewMode::Sequential);

        for i in 0..20 {
            let run = pipeline.run(&request(), &RunCtx::new(i, &request())).await;
            let entries = run.history.entries();
            let writer = run.cast.writer.name();
            let editor = run.cast.editor.name();

            assert!(entries[0].content.starts_with(&format!("[{} ", writer)));
            assert!(entries[5].content.starts_with(&format!("[{} ", writer)));
            assert!(entries[4].content.starts_with(&format!("[{} ", editor)));
            assert!(entries[6].content.starts_with(&format!("[{} ", editor)));
        }
    }

    #[tokio::test]
    async fn test_overrides_pick_named_models() {
        let backends = [EchoBackend::new("alpha"), EchoBackend::new("beta"), EchoBackend::new("gamma")];
        let pipeline = pipeline(&backends, ReviewMode::Sequential);
        let mut request = request();
        request.models.writer = Some("beta".to_string());
        request.models.reviewers = vec!["gamma".to_string(), "alpha".to_string()];
        request.models.editor = Some("alpha".to_string());

        let run = pipeline.run(&request, &RunCtx::new(1, &request)).await;

        assert_eq!(run.cast.writer.name(), "beta");
        assert_eq!(run.cast.reviewers[0].name(), "gamma");
        assert_eq!(run.cast.reviewers[1].name(), "alpha");
        assert_eq!(run.cast.editor.name(), "alpha");
        assert!(Arc::ptr_eq(&run.cast.writer, pipeline.pool().get("beta").unwrap()));
    }

    #[tokio::test]
    async fn test_generation_failure_is_recorded_and_run_continues() {
        let writer_system = prompts::system_message(Stage::Writer);
        let backend = EchoBackend::failing_on("solo", writer_system);
        let pipeline = pipeline(&[backend.clone()], ReviewMode::Sequential);

        let run = pipeline.run(&request(), &RunCtx::new(1, &request())).await;
        let entries = run.history.entries();

        assert_eq!(entries.len(), 7);
        assert_eq!(entries[0].content, failure_text(2));
        for prompt in reviewer_prompts(&backend) {
            assert!(prompt.contains("Error: Unable to get response after 2 attempts"));
        }
        // 起草重试 2 次，其余 6 步各 1 次
        assert_eq!(backend.calls().len(), 8);
    }
}
