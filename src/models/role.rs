//! 历史记录中的角色标签
//!
//! 标签只是展示字符串，流程各环节和摘要都按这里的常量写入、查找

pub const ITEM_WRITER: &str = "Item Writer";
pub const EDITORIAL_STAFF: &str = "Editorial Staff";
pub const AUTHOR_REVISION: &str = "Author Revision";
pub const FINAL_DECISION: &str = "Final Editorial Decision";

/// 第 `n` 位审稿人（从 1 开始）
pub fn reviewer(n: u8) -> String {
    format!("Reviewer {}", n)
}
