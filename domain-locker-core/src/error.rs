//! 统一错误类型定义

use serde::Serialize;
use thiserror::Error;

// 向上层透出库错误类型
pub use domain_locker_backend::BackendError;

/// Core 层错误类型
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// 域名不存在
    #[error("Domain not found: {0}")]
    DomainNotFound(String),

    /// 输入校验失败
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 配置错误（凭据文件缺失、格式非法等）
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// 存储层错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 序列化错误
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 后端错误（从库转换）
    #[error("{0}")]
    Backend(#[from] BackendError),
}

impl CoreError {
    /// 是否为预期内行为（用户输入、资源不存在等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，返回 `false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::DomainNotFound(_) | Self::ValidationError(_) | Self::ConfigError(_) => true,
            Self::StorageError(_) | Self::SerializationError(_) => false,
            Self::Backend(e) => e.is_expected(),
        }
    }

    /// 是否为写入门禁拒绝
    #[must_use]
    pub fn is_write_denial(&self) -> bool {
        matches!(self, Self::Backend(e) if e.is_write_denial())
    }
}

/// Core 层 Result 类型别名
pub type CoreResult<T> = Result<T, CoreError>;
