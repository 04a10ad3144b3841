pub mod toml_loader;

pub use toml_loader::{load_item_requests, load_model_configs};
