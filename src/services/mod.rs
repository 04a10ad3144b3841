pub mod generation;
pub mod model_pool;
pub mod report_writer;
pub mod summary_extractor;

pub use generation::{failure_text, GenerationClient, RetryPolicy, SamplingParams};
pub use model_pool::{ModelHandle, ModelPool, RoleHint};
pub use report_writer::ReportWriter;
pub use summary_extractor::{extract_json_payload, SummaryExtractor, SummaryPayload};
