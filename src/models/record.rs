use serde::{Deserialize, Serialize};

use crate::models::history::{HistoryEntry, HistoryLog};

/// 一次流程对外输出的记录
///
/// 成功时是全部历史条目；流程无法启动时只有一条 `{ "error": ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunRecord {
    Entry(HistoryEntry),
    Error { error: String },
}

impl RunRecord {
    pub fn error(message: impl Into<String>) -> Self {
        RunRecord::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RunRecord::Error { .. })
    }
}

impl From<HistoryLog> for Vec<RunRecord> {
    fn from(history: HistoryLog) -> Self {
        history
            .into_entries()
            .into_iter()
            .map(RunRecord::Entry)
            .collect()
    }
}

/// 从记录中恢复历史（忽略错误记录）
pub fn history_from_records(records: &[RunRecord]) -> HistoryLog {
    records
        .iter()
        .filter_map(|record| match record {
            RunRecord::Entry(entry) => Some(entry.clone()),
            RunRecord::Error { .. } => None,
        })
        .collect::<Vec<_>>()
        .into()
}
