//! 生成服务 - 业务能力层
//!
//! 对单个模型发起一次补全请求，失败时按固定间隔重试。重试用尽后返回错误文本而不是报错，
//! 调用方把这段文本当作普通内容写入历史，流程继续往下走。

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::clients::CompletionRequest;
use crate::error::LlmError;
use crate::services::model_pool::ModelHandle;

/// 重试策略：最多尝试次数 + 固定间隔
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(2))
    }
}

/// 采样参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

/// 生成客户端
#[derive(Debug, Clone, Default)]
pub struct GenerationClient {
    policy: RetryPolicy,
    params: SamplingParams,
}

impl GenerationClient {
    pub fn new(policy: RetryPolicy, params: SamplingParams) -> Self {
        Self { policy, params }
    }

    /// 发起请求，失败时返回错误文本
    pub async fn complete(&self, handle: &ModelHandle, system_message: &str, user_message: &str) -> String {
        match self.try_complete(handle, system_message, user_message).await {
            Ok(text) => text,
            Err(e) => {
                warn!("❌ 模型 {} 调用最终失败: {}", handle.name(), e);
                failure_text(self.policy.max_attempts.max(1))
            }
        }
    }

    /// 发起请求，重试用尽后返回 `LlmError::RetriesExhausted`
    ///
    /// 空白回复与网络错误、空响应一样视为失败；成功时原样返回模型输出
    pub async fn try_complete(
        &self,
        handle: &ModelHandle,
        system_message: &str,
        user_message: &str,
    ) -> Result<String, LlmError> {
        let attempts = self.policy.max_attempts.max(1);
        let request = CompletionRequest {
            model: handle.name(),
            system_message,
            user_message,
            temperature: self.params.temperature,
            max_tokens: self.params.max_tokens,
        };

        let mut last_error = String::new();

        for attempt in 1..=attempts {
            let result = match handle.backend().complete(&request).await {
                Ok(text) if text.trim().is_empty() => Err(LlmError::EmptyContent {
                    model: handle.name().to_string(),
                }),
                other => other,
            };

            match result {
                Ok(text) => {
                    debug!("模型 {} 第 {} 次尝试成功", handle.name(), attempt);
                    return Ok(text);
                }
                Err(e) => {
                    warn!("⚠️ Attempt {} failed ({}): {}", attempt, handle.name(), e);
                    last_error = e.to_string();
                    if attempt < attempts {
                        sleep(self.policy.delay).await;
                    }
                }
            }
        }

        Err(LlmError::RetriesExhausted {
            model: handle.name().to_string(),
            attempts,
            last_error,
        })
    }
}

/// 重试用尽后写入历史的错误文本
pub fn failure_text(attempts: u32) -> String {
    format!("Error: Unable to get response after {} attempts", attempts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ChatBackend;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// 前 `failures` 次失败，之后返回固定文本
    struct FlakyBackend {
        failures: usize,
        calls: AtomicUsize,
        reply: &'static str,
    }

    #[async_trait]
    impl ChatBackend for FlakyBackend {
        async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(LlmError::EmptyResponse {
                    model: request.model.to_string(),
                })
            } else {
                Ok(self.reply.to_string())
            }
        }
    }

    fn flaky(failures: usize, reply: &'static str) -> (Arc<FlakyBackend>, ModelHandle) {
        let backend = Arc::new(FlakyBackend {
            failures,
            calls: AtomicUsize::new(0),
            reply,
        });
        let handle = ModelHandle::new("model-alpha", backend.clone());
        (backend, handle)
    }

    fn fast_client() -> GenerationClient {
        GenerationClient::new(RetryPolicy::new(5, Duration::ZERO), SamplingParams::default())
    }

    #[tokio::test]
    async fn test_always_failing_backend_is_called_five_times() {
        let (backend, handle) = flaky(usize::MAX, "");
        let text = fast_client().complete(&handle, "system", "user").await;

        assert_eq!(backend.calls.load(Ordering::SeqCst), 5);
        assert!(text.contains('5'));
        assert_eq!(text, "Error: Unable to get response after 5 attempts");
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let (backend, handle) = flaky(2, "generated item");
        let text = fast_client().complete(&handle, "system", "user").await;

        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
        assert_eq!(text, "generated item");
    }

    #[tokio::test]
    async fn test_reply_is_kept_verbatim() {
        let (_backend, handle) = flaky(0, "\n  (A) option\n(B) option  \n");
        let text = fast_client().complete(&handle, "system", "user").await;

        assert_eq!(text, "\n  (A) option\n(B) option  \n");
    }

    #[tokio::test]
    async fn test_blank_reply_counts_as_failure() {
        let (backend, handle) = flaky(0, "   ");
        let result = fast_client().try_complete(&handle, "system", "user").await;

        assert_eq!(backend.calls.load(Ordering::SeqCst), 5);
        assert!(matches!(
            result,
            Err(LlmError::RetriesExhausted { attempts: 5, .. })
        ));
    }

    #[tokio::test]
    async fn test_delay_applies_between_attempts_only() {
        let (_backend, handle) = flaky(usize::MAX, "");
        let client = GenerationClient::new(
            RetryPolicy::new(3, Duration::from_millis(20)),
            SamplingParams::default(),
        );

        let started = std::time::Instant::now();
        let _ = client.try_complete(&handle, "system", "user").await;
        let elapsed = started.elapsed();

        // 3 次尝试之间只有 2 次等待
        assert!(elapsed >= Duration::from_millis(40));
        assert!(elapsed < Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_passes_sampling_params() {
        struct CapturingBackend(std::sync::Mutex<Option<(f32, u32)>>);

        #[async_trait]
        impl ChatBackend for CapturingBackend {
            async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
                *self.0.lock().unwrap() = Some((request.temperature, request.max_tokens));
                Ok("ok".to_string())
            }
        }

        let backend = Arc::new(CapturingBackend(std::sync::Mutex::new(None)));
        let handle = ModelHandle::new("model-alpha", backend.clone());
        GenerationClient::default()
            .complete(&handle, "system", "user")
            .await;

        let (temperature, max_tokens) = backend.0.lock().unwrap().unwrap();
        assert!((temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(max_tokens, 2000);
    }
}
