//! # MCQ Workshop
//!
//! 多角色协作的 USMLE 选择题出题流程
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 文本生成能力（`ChatBackend`），OpenAI 兼容实现
//!
//! ### ② 业务能力层（Services）
//! - `ModelPool` - 模型池，按名称或随机选择模型
//! - `GenerationClient` - 单次补全 + 固定间隔重试，失败降级为错误文本
//! - `SummaryExtractor` - 初稿/终稿对比摘要
//! - `ReportWriter` - HTML 报告与 JSON 文件
//!
//! ### ③ 流程层（Workflow）
//! - `ItemPipeline` - 出题 → 三位审稿 → 编辑汇总 → 作者修订 → 最终决定
//! - `RunCtx` - 单次流程上下文
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量请求处理，管理并发
//! - `orchestrator/item_processor` - 单个请求处理，写出报告
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, ConfigError, LlmError};
pub use models::{HistoryEntry, HistoryLog, ItemRequest, ModelConfig, RunRecord, StructuredSummary};
pub use orchestrator::{develop_item, App};
pub use services::{GenerationClient, ModelPool, SummaryExtractor};
pub use workflow::{ItemPipeline, RunCtx, Stage};
