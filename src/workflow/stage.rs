use std::borrow::Cow;
use std::fmt;

use crate::models::{role, REVIEWER_COUNT};
use crate::services::RoleHint;

/// 流程中的固定环节
///
/// 每个环节恰好产生一条历史记录；写入历史时只保留展示标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// 出题人起草
    Writer,
    /// 第 n 位审稿人（1..=3）
    Reviewer(u8),
    /// 编辑部汇总
    Editorial,
    /// 作者修订
    AuthorRevision,
    /// 最终编辑决定
    FinalDecision,
}

impl Stage {
    /// 按执行顺序列出全部环节
    pub fn sequence() -> Vec<Stage> {
        let mut stages = vec![Stage::Writer];
        stages.extend(Self::reviewers());
        stages.extend([Stage::Editorial, Stage::AuthorRevision, Stage::FinalDecision]);
        stages
    }

    pub fn reviewers() -> impl Iterator<Item = Stage> {
        (1..=REVIEWER_COUNT as u8).map(Stage::Reviewer)
    }

    /// 写入历史记录的角色标签
    pub fn label(self) -> Cow<'static, str> {
        match self {
            Stage::Writer => Cow::Borrowed(role::ITEM_WRITER),
            Stage::Reviewer(n) => Cow::Owned(role::reviewer(n)),
            Stage::Editorial => Cow::Borrowed(role::EDITORIAL_STAFF),
            Stage::AuthorRevision => Cow::Borrowed(role::AUTHOR_REVISION),
            Stage::FinalDecision => Cow::Borrowed(role::FINAL_DECISION),
        }
    }

    /// 历史记录中的版本号，从 1 开始连续编号
    pub fn version(self) -> u32 {
        match self {
            Stage::Writer => 1,
            Stage::Reviewer(n) => 1 + n as u32,
            Stage::Editorial => 2 + REVIEWER_COUNT as u32,
            Stage::AuthorRevision => 3 + REVIEWER_COUNT as u32,
            Stage::FinalDecision => 4 + REVIEWER_COUNT as u32,
        }
    }

    pub fn role_hint(self) -> RoleHint {
        match self {
            Stage::Writer | Stage::AuthorRevision => RoleHint::Writer,
            Stage::Reviewer(_) => RoleHint::Reviewer,
            Stage::Editorial | Stage::FinalDecision => RoleHint::Editor,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
