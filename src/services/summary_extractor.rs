//! 版本摘要服务 - 业务能力层
//!
//! 把完整的出题历史交给模型，请它还原出初稿和终稿的结构化对比，再从回复中尽力抽取 JSON。
//! 抽取只做语法层面的检查（外层花括号 + JSON 解析），不校验字段是否齐全。

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::models::{HistoryLog, StructuredSummary};
use crate::services::generation::GenerationClient;
use crate::services::model_pool::{ModelPool, RoleHint};

const SUMMARIZER_SYSTEM: &str = "You are a technical summarizer. Extract the first and final versions of the MCQ from the history and output valid JSON only.";

const SUMMARY_TEMPLATE: &str = r#"{
    "draft": {
        "version": "draft",
        "question": "[full question stem]",
        "options": ["A) [option text]", "B) [option text]", "C) [option text]", "D) [option text]", "E) [option text]"],
        "correct_answer": "[letter A-E]"
    },
    "final": {
        "version": "final",
        "question": "[full question stem]",
        "options": ["A) [option text]", "B) [option text]", "C) [option text]", "D) [option text]", "E) [option text]"],
        "correct_answer": "[letter A-E]"
    }
}"#;

/// 第一个 `{` 到最后一个 `}` 之间的片段（可跨行）
static JSON_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("Invalid JSON span regex"));

/// 抽取出的摘要
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryPayload {
    /// 模型回复中截取出的 JSON 原文
    pub raw: String,
}

impl SummaryPayload {
    /// 尽力转换为结构化摘要，无法识别的字段保持为空
    pub fn structured(&self) -> StructuredSummary {
        StructuredSummary::from_payload(&self.raw).unwrap_or_default()
    }
}

/// 版本摘要服务
#[derive(Debug, Clone, Default)]
pub struct SummaryExtractor {
    client: GenerationClient,
}

impl SummaryExtractor {
    pub fn new(client: GenerationClient) -> Self {
        Self { client }
    }

    /// 生成初稿/终稿对比摘要
    ///
    /// 历史为空、模型调用失败或回复中没有可解析的 JSON 时返回 `None`
    pub async fn extract(
        &self,
        history: &HistoryLog,
        pool: &ModelPool,
        summarizer: Option<&str>,
    ) -> Option<SummaryPayload> {
        if history.is_empty() {
            warn!("⚠️ 历史记录为空，跳过摘要生成");
            return None;
        }

        let handle = pool.select(RoleHint::Summarizer, summarizer);
        info!("📋 生成版本摘要 (模型: {})", handle.name());

        let prompt = build_summary_prompt(history);
        debug!("摘要提示词长度: {} 字符", prompt.len());

        let response = match self
            .client
            .try_complete(&handle, SUMMARIZER_SYSTEM, &prompt)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!("❌ 摘要生成失败: {}", e);
                return None;
            }
        };

        match extract_json_payload(&response) {
            Some(raw) => {
                info!("✓ 摘要 JSON 抽取成功 ({} 字符)", raw.len());
                Some(SummaryPayload {
                    raw: raw.to_string(),
                })
            }
            None => {
                warn!("⚠️ 模型回复中没有可解析的 JSON");
                None
            }
        }
    }
}

/// 构建摘要提示词
fn build_summary_prompt(history: &HistoryLog) -> String {
    format!(
        r#"Please see the entire history of an item's development, and extract information of the first draft and finalized version of the item so that one can track the differences in between. Please follow this JSON format:
{}

Here is the complete development history:

{}"#,
        SUMMARY_TEMPLATE,
        history.render_as_text()
    )
}

/// 从自由文本中抽取 JSON
///
/// 1. 定位第一个 `{` 到最后一个 `}` 之间的片段
/// 2. 片段必须能被解析为 JSON，否则返回 `None`
pub fn extract_json_payload(text: &str) -> Option<&str> {
    let span = JSON_SPAN.find(text)?.as_str();

    match serde_json::from_str::<Value>(span) {
        Ok(_) => Some(span),
        Err(e) => {
            debug!("JSON 解析失败: {}", e);
            None
        }
    }
}
