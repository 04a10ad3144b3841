//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量出题处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载出题请求（Vec<ItemRequest>）
//! - 控制并发数量（Semaphore）
//! - 持有共享的模型池
//! - 输出全局统计信息
//!
//! ### `item_processor` - 单个请求处理器
//! - 跑完一次出题流程
//! - 写出报告、生成版本摘要
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<ItemRequest>)
//!     ↓
//! item_processor (处理单个 ItemRequest)
//!     ↓
//! workflow::ItemPipeline (固定顺序的角色流程)
//!     ↓
//! services (能力层：模型池 / 生成 / 摘要 / 报告)
//!     ↓
//! clients (基础设施：ChatBackend)
//! ```

pub mod batch_processor;
pub mod item_processor;

pub use batch_processor::{App, ProcessingStats};
pub use item_processor::{develop_item, process_item, ItemOutcome, SummaryStatus};
