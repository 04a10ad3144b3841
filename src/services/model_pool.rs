//! 模型池 - 业务能力层
//!
//! 持有全部已配置的模型，负责按名称或随机选择模型。构建完成后只读，可在多个流程间共享。

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::clients::{ChatBackend, OpenAiBackend};
use crate::error::{ConfigError, LlmError};
use crate::models::{ModelConfig, ModelOverrides, REVIEWER_COUNT};

/// 选择模型时声明的角色
///
/// 目前不影响选择结果，只用于日志
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleHint {
    Writer,
    Reviewer,
    Editor,
    Summarizer,
}

impl fmt::Display for RoleHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoleHint::Writer => "writer",
            RoleHint::Reviewer => "reviewer",
            RoleHint::Editor => "editor",
            RoleHint::Summarizer => "summarizer",
        };
        f.write_str(name)
    }
}

/// 一个可用的模型
pub struct ModelHandle {
    name: String,
    backend: Arc<dyn ChatBackend>,
}

impl ModelHandle {
    pub fn new(name: impl Into<String>, backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            name: name.into(),
            backend,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend(&self) -> &dyn ChatBackend {
        self.backend.as_ref()
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// 模型池
///
/// 保持配置中的插入顺序，构建成功后至少包含一个模型
#[derive(Debug)]
pub struct ModelPool {
    handles: Vec<Arc<ModelHandle>>,
}

impl ModelPool {
    /// 使用 OpenAI 兼容后端构建模型池
    pub fn from_configs(configs: &[ModelConfig]) -> Result<Self, ConfigError> {
        Self::from_configs_with(configs, |config| {
            let backend = OpenAiBackend::new(config)?;
            Ok(Arc::new(backend) as Arc<dyn ChatBackend>)
        })
    }

    /// 使用自定义后端工厂构建模型池
    ///
    /// - 缺少名称或密钥的条目直接过滤
    /// - 单个后端创建失败只记录日志，不中断
    /// - 重名的条目只保留第一个
    pub fn from_configs_with<F>(configs: &[ModelConfig], factory: F) -> Result<Self, ConfigError>
    where
        F: Fn(&ModelConfig) -> Result<Arc<dyn ChatBackend>, LlmError>,
    {
        if configs.is_empty() {
            return Err(ConfigError::EmptyConfiguration);
        }

        let mut handles = Vec::new();
        let mut seen = HashSet::new();

        for config in configs.iter().filter(|c| c.is_complete()) {
            let name = config.model_name.trim();
            if !seen.insert(name.to_string()) {
                warn!("⚠️ 模型 {} 重复配置，忽略后出现的条目", name);
                continue;
            }

            match factory(config) {
                Ok(backend) => handles.push(Arc::new(ModelHandle::new(name, backend))),
                Err(e) => warn!("⚠️ 初始化模型 {} 失败: {}", name, e),
            }
        }

        let skipped = configs.len() - handles.len();
        if handles.is_empty() {
            return Err(ConfigError::NoUsableModels { skipped });
        }

        info!("✓ 模型池就绪: {} 个可用模型，跳过 {} 条配置", handles.len(), skipped);
        Ok(Self { handles })
    }

    /// 直接由模型句柄构建
    pub fn from_handles(handles: Vec<ModelHandle>) -> Result<Self, ConfigError> {
        if handles.is_empty() {
            return Err(ConfigError::NoUsableModels { skipped: 0 });
        }
        Ok(Self {
            handles: handles.into_iter().map(Arc::new).collect(),
        })
    }

    /// 选择模型
    ///
    /// 指定名称且存在时返回该模型，否则从池中均匀随机选一个。`role` 不参与选择。
    pub fn select(&self, role: RoleHint, requested: Option<&str>) -> Arc<ModelHandle> {
        let requested = requested.map(str::trim).filter(|name| !name.is_empty());

        if let Some(name) = requested {
            if let Some(handle) = self.get(name) {
                debug!("[{}] 使用指定模型: {}", role, name);
                return Arc::clone(handle);
            }
            warn!("[{}] 指定的模型 {} 不在模型池中，改为随机选择", role, name);
        }

        let index = rand::thread_rng().gen_range(0..self.handles.len());
        let handle = &self.handles[index];
        debug!("[{}] 随机选择模型: {}", role, handle.name());
        Arc::clone(handle)
    }

    /// 按名称查找
    pub fn get(&self, name: &str) -> Option<&Arc<ModelHandle>> {
        self.handles.iter().find(|h| h.name() == name)
    }

    /// 全部模型名称（插入顺序）
    pub fn names(&self) -> Vec<String> {
        self.handles.iter().map(|h| h.name().to_string()).collect()
    }

    pub fn handles(&self) -> &[Arc<ModelHandle>] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// 为每个角色随机指定一个模型名称
    pub fn shuffle_overrides(&self) -> ModelOverrides {
        let mut rng = rand::thread_rng();
        let mut pick = || {
            let index = rng.gen_range(0..self.handles.len());
            self.handles[index].name().to_string()
        };

        ModelOverrides {
            writer: Some(pick()),
            reviewers: (0..REVIEWER_COUNT).map(|_| pick()).collect(),
            editor: Some(pick()),
            summarizer: Some(pick()),
        }
    }
}
