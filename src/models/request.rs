use serde::{Deserialize, Serialize};

use crate::models::taxonomy::{BodySystem, Competency, Discipline};

/// 审稿人数量
pub const REVIEWER_COUNT: usize = 3;

/// 各角色指定的模型名称
///
/// 为空或名称不在模型池中时，由模型池随机选择
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writer: Option<String>,
    /// 按审稿人序号排列，不足三个时其余审稿人随机选择
    #[serde(default)]
    pub reviewers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summarizer: Option<String>,
}

impl ModelOverrides {
    /// 第 `slot` 位审稿人（从 0 开始）指定的模型
    pub fn reviewer(&self, slot: usize) -> Option<&str> {
        self.reviewers.get(slot).map(String::as_str)
    }
}

/// 一次出题请求
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemRequest {
    #[serde(default)]
    pub disciplines: Vec<Discipline>,
    #[serde(default)]
    pub systems: Vec<BodySystem>,
    #[serde(default)]
    pub competencies: Vec<Competency>,
    /// 需要融入题目的额外要素
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub models: ModelOverrides,
}

/// 出题请求文件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestsFile {
    #[serde(default)]
    pub items: Vec<ItemRequest>,
}
