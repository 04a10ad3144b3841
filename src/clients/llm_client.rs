//! LLM 客户端 - 基础设施层
//!
//! 把文本生成服务当作一个不透明的能力："给定系统指令和用户指令，返回生成文本或失败"。
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点（兼容 OpenAI API 的服务）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::models::ModelConfig;

/// 一次补全请求
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub system_message: &'a str,
    pub user_message: &'a str,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// 文本生成能力
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError>;
}

/// OpenAI 兼容的文本生成后端
pub struct OpenAiBackend {
    client: Client<OpenAIConfig>,
}

impl OpenAiBackend {
    /// 根据模型配置创建后端
    ///
    /// 端点必须是 http(s) 地址，否则视为配置错误
    pub fn new(config: &ModelConfig) -> Result<Self, LlmError> {
        let mut openai_config = OpenAIConfig::new().with_api_key(config.api_key.trim());

        if let Some(base_url) = config.endpoint() {
            if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                return Err(LlmError::InvalidEndpoint {
                    model: config.model_name.clone(),
                    base_url: base_url.to_string(),
                });
            }
            openai_config = openai_config.with_api_base(base_url.trim_end_matches('/'));
        }

        Ok(Self {
            client: Client::with_config(openai_config),
        })
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        let model = request.model;
        debug!("调用 LLM API，模型: {}", model);
        debug!("用户消息长度: {} 字符", request.user_message.len());

        let build_error = |e: async_openai::error::OpenAIError| LlmError::RequestBuild {
            model: model.to_string(),
            message: e.to_string(),
        };

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(request.system_message)
            .build()
            .map_err(build_error)?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(request.user_message)
            .build()
            .map_err(build_error)?;

        let messages = vec![
            ChatCompletionRequestMessage::System(system_msg),
            ChatCompletionRequestMessage::User(user_msg),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .temperature(request.temperature)
            .max_tokens(request.max_tokens)
            .build()
            .map_err(build_error)?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            LlmError::api_call_failed(model, e)
        })?;

        debug!("LLM API 调用成功");

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::EmptyResponse {
                model: model.to_string(),
            })?;

        choice.message.content.ok_or_else(|| LlmError::EmptyContent {
            model: model.to_string(),
        })
    }
}
