//! 出题流程上下文
//!
//! 封装"我正在处理第几个出题请求"这一信息，用于日志前缀

use std::fmt::Display;

use crate::models::ItemRequest;
use crate::utils::truncate_text;

/// 单次流程上下文
#[derive(Debug, Clone)]
pub struct RunCtx {
    /// 请求序号（从1开始，仅用于日志显示）
    pub run_index: usize,

    /// 关键词预览
    pub keywords: String,
}

impl RunCtx {
    pub fn new(run_index: usize, request: &ItemRequest) -> Self {
        Self {
            run_index,
            keywords: truncate_text(request.keywords.trim(), 30),
        }
    }
}

impl Display for RunCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.keywords.is_empty() {
            write!(f, "[流程 #{}]", self.run_index)
        } else {
            write!(f, "[流程 #{} 关键词#{}]", self.run_index, self.keywords)
        }
    }
}
