//! 出题历史记录
//!
//! 一次流程内只追加、不修改的有序记录；追加顺序即时间顺序，也是语义顺序
//! （后面的条目在生成时可以看到前面所有条目）。

use serde::{Deserialize, Serialize};

/// 空历史渲染出的占位文本，保证下游提示词不会在空上下文上静默构建
pub const EMPTY_HISTORY_TEXT: &str = "No history available.";

/// 单条历史记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    /// 角色标签，只是展示字符串
    pub role: String,
    /// 生成的文本，或者生成失败时的错误文本
    pub content: String,
    pub version: u32,
}

impl HistoryEntry {
    pub fn new(role: impl Into<String>, content: impl Into<String>, version: u32) -> Self {
        Self {
            timestamp: chrono::Local::now()
                .format("%Y-%m-%d %H:%M:%S%.6f")
                .to_string(),
            role: role.into(),
            content: content.into(),
            version,
        }
    }

    /// 渲染为 `[timestamp] role (Version v):\ncontent\n`
    pub fn render(&self) -> String {
        format!(
            "[{}] {} (Version {}):\n{}\n",
            self.timestamp, self.role, self.version, self.content
        )
    }
}

/// 历史记录
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条记录，返回自身以便链式调用
    pub fn append(&mut self, role: impl Into<String>, content: impl Into<String>, version: u32) -> &mut Self {
        self.entries.push(HistoryEntry::new(role, content, version));
        self
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<HistoryEntry> {
        self.entries
    }

    /// 将全部记录渲染为一段文本，条目之间以空行分隔
    pub fn render_as_text(&self) -> String {
        if self.entries.is_empty() {
            return EMPTY_HISTORY_TEXT.to_string();
        }

        self.entries
            .iter()
            .map(HistoryEntry::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Vec<HistoryEntry>> for HistoryLog {
    fn from(entries: Vec<HistoryEntry>) -> Self {
        Self { entries }
    }
}
