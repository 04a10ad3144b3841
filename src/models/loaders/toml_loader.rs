use crate::models::model_config::{ModelConfig, ModelsFile};
use crate::models::request::{ItemRequest, RequestsFile};
use crate::error::{AppError, AppResult};
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs;

/// 读取并解析一个 TOML 文件
async fn load_toml<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    toml::from_str(&content).map_err(|e| AppError::toml_parse_failed(path.display().to_string(), e))
}

/// 从模型配置文件加载全部模型配置（不做过滤，过滤由模型池负责）
pub async fn load_model_configs(path: impl AsRef<Path>) -> AppResult<Vec<ModelConfig>> {
    let path = path.as_ref();
    let file: ModelsFile = load_toml(path).await?;
    tracing::info!(
        "从 {} 读取到 {} 条模型配置",
        path.file_name().unwrap_or_default().to_string_lossy(),
        file.models.len()
    );
    Ok(file.models)
}

/// 从请求文件加载全部出题请求
pub async fn load_item_requests(path: impl AsRef<Path>) -> AppResult<Vec<ItemRequest>> {
    let path = path.as_ref();
    let file: RequestsFile = load_toml(path).await?;
    tracing::info!(
        "从 {} 读取到 {} 个出题请求",
        path.file_name().unwrap_or_default().to_string_lossy(),
        file.items.len()
    );
    Ok(file.items)
}
