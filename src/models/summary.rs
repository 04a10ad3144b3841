//! 初稿/终稿对比摘要
//!
//! 摘要是对自由文本的再解读，不具权威性：字段可能为空，也可能与历史记录不一致。

use serde::{Deserialize, Serialize};

use crate::models::history::{HistoryEntry, HistoryLog};
use crate::models::role;

/// 某一版本的题目
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemVersion {
    pub version: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl ItemVersion {
    fn from_entry(label: &str, entry: &HistoryEntry) -> Self {
        Self {
            version: label.to_string(),
            question: entry.content.clone(),
            options: Vec::new(),
            correct_answer: String::new(),
        }
    }
}

/// 结构化摘要
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredSummary {
    pub draft: ItemVersion,
    #[serde(rename = "final")]
    pub final_version: ItemVersion,
}

impl StructuredSummary {
    /// 宽松解析模型返回的 JSON，缺失字段保持默认值
    pub fn from_payload(payload: &str) -> Option<Self> {
        serde_json::from_str(payload).ok()
    }

    /// 不调用模型，直接从历史记录中取初稿和终稿
    ///
    /// - 初稿：第一条 "Item Writer"
    /// - 终稿：最终决定之前最近的一条 "Author Revision"；没有则取最近的一条 "Editorial Staff"
    ///
    /// 选项和答案需要模型抽取，这里留空。
    pub fn from_history(history: &HistoryLog) -> Option<Self> {
        let entries = history.entries();

        let draft = entries
            .iter()
            .find(|e| e.role == role::ITEM_WRITER)?;

        let decision_at = entries
            .iter()
            .position(|e| e.role == role::FINAL_DECISION)
            .unwrap_or(entries.len());
        let before_decision = &entries[..decision_at];

        let final_entry = latest_with_role(before_decision, role::AUTHOR_REVISION)
            .or_else(|| latest_with_role(before_decision, role::EDITORIAL_STAFF))?;

        Some(Self {
            draft: ItemVersion::from_entry("draft", draft),
            final_version: ItemVersion::from_entry("final", final_entry),
        })
    }
}

fn latest_with_role<'a>(entries: &'a [HistoryEntry], role: &str) -> Option<&'a HistoryEntry> {
    entries.iter().rev().find(|e| e.role == role)
}
