use std::time::Duration;

use crate::services::{RetryPolicy, SamplingParams};

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 模型配置文件（TOML，`[[models]]` 列表）
    pub models_file: String,
    /// 出题请求文件（TOML，`[[items]]` 列表）
    pub requests_file: String,
    /// 报告输出目录
    pub output_dir: String,
    /// 同时运行的出题流程数量
    pub max_concurrent_runs: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- LLM 调用配置 ---
    pub retry_max_attempts: u32,
    pub retry_delay_secs: u64,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    // --- 流程配置 ---
    /// 三位审稿人是否并发执行
    pub concurrent_reviews: bool,
    /// 流程结束后是否生成版本对比摘要
    pub generate_summary: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models_file: "models.toml".to_string(),
            requests_file: "requests.toml".to_string(),
            output_dir: "output".to_string(),
            max_concurrent_runs: 4,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            retry_max_attempts: 5,
            retry_delay_secs: 2,
            llm_temperature: 0.7,
            llm_max_tokens: 2000,
            concurrent_reviews: false,
            generate_summary: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            models_file: std::env::var("MODELS_FILE").unwrap_or(default.models_file),
            requests_file: std::env::var("REQUESTS_FILE").unwrap_or(default.requests_file),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            max_concurrent_runs: env_parse("MAX_CONCURRENT_RUNS").unwrap_or(default.max_concurrent_runs),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            retry_max_attempts: env_parse("RETRY_MAX_ATTEMPTS").unwrap_or(default.retry_max_attempts),
            retry_delay_secs: env_parse("RETRY_DELAY_SECS").unwrap_or(default.retry_delay_secs),
            llm_temperature: env_parse("LLM_TEMPERATURE").unwrap_or(default.llm_temperature),
            llm_max_tokens: env_parse("LLM_MAX_TOKENS").unwrap_or(default.llm_max_tokens),
            concurrent_reviews: env_parse("CONCURRENT_REVIEWS").unwrap_or(default.concurrent_reviews),
            generate_summary: env_parse("GENERATE_SUMMARY").unwrap_or(default.generate_summary),
        }
    }

    /// 重试策略
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_max_attempts.max(1),
            Duration::from_secs(self.retry_delay_secs),
        )
    }

    /// 采样参数
    pub fn sampling_params(&self) -> SamplingParams {
        SamplingParams {
            temperature: self.llm_temperature,
            max_tokens: self.llm_max_tokens,
        }
    }
}

fn env_parse<T: std::str::FromStr>(var_name: &str) -> Option<T> {
    std::env::var(var_name).ok().and_then(|v| v.parse().ok())
}
