pub mod item_pipeline;
pub mod prompts;
pub mod run_ctx;
pub mod stage;

pub use item_pipeline::{Cast, ItemPipeline, PipelineRun, ReviewMode};
pub use run_ctx::RunCtx;
pub use stage::Stage;
