pub mod history;
pub mod loaders;
pub mod model_config;
pub mod record;
pub mod request;
pub mod role;
pub mod summary;
pub mod taxonomy;

pub use history::{HistoryEntry, HistoryLog, EMPTY_HISTORY_TEXT};
pub use loaders::{load_item_requests, load_model_configs};
pub use model_config::{ModelConfig, ModelsFile};
pub use record::{history_from_records, RunRecord};
pub use request::{ItemRequest, ModelOverrides, RequestsFile, REVIEWER_COUNT};
pub use summary::{ItemVersion, StructuredSummary};
pub use taxonomy::{BodySystem, Competency, Discipline};
