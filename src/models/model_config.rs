use serde::{Deserialize, Serialize};

/// 单个模型的配置（对应模型配置表中的一行）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub api_key: String,
    /// OpenAI 兼容端点，不填则使用官方地址
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ModelConfig {
    pub fn new(
        model_name: impl Into<String>,
        api_key: impl Into<String>,
        base_url: Option<String>,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            api_key: api_key.into(),
            base_url,
        }
    }

    /// 名称和密钥都不为空
    pub fn is_complete(&self) -> bool {
        !self.model_name.trim().is_empty() && !self.api_key.trim().is_empty()
    }

    /// 去掉空白后的端点地址
    pub fn endpoint(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// 模型配置文件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelsFile {
    #[serde(default)]
    pub models: Vec<ModelConfig>,
}
