//! 业务逻辑服务层

mod domain_service;
mod host_service;
mod monitor_service;
mod write_gate;

pub use domain_service::DomainService;
pub use host_service::HostService;
pub use monitor_service::{ExpiryReminder, MonitorService, REMINDER_THRESHOLD_DAYS};
pub use write_gate::{WRITE_OPERATIONS, WriteGate};

use std::sync::Arc;

use domain_locker_backend::QueryService;

use crate::traits::FeatureFlagStore;

/// 服务上下文 - 持有所有依赖
///
/// 平台层需要创建此上下文，并注入平台特定的开关实现。
/// 注入的 `backend` 通常已被 [`WriteGate`] 包装，服务层不感知门禁存在。
pub struct ServiceContext {
    /// 查询服务（可能已被写入门禁包装）
    pub backend: Arc<dyn QueryService>,
    /// 功能开关存储
    pub flag_store: Arc<dyn FeatureFlagStore>,
}

impl ServiceContext {
    /// 创建服务上下文
    #[must_use]
    pub fn new(backend: Arc<dyn QueryService>, flag_store: Arc<dyn FeatureFlagStore>) -> Self {
        Self {
            backend,
            flag_store,
        }
    }

    /// 创建带写入门禁的服务上下文
    ///
    /// 将 `backend` 包装进 [`WriteGate`]（默认写操作集合），
    /// 之后所有写操作都要经过 `flag_store` 放行。
    #[must_use]
    pub fn gated(backend: Arc<dyn QueryService>, flag_store: Arc<dyn FeatureFlagStore>) -> Self {
        let gated: Arc<dyn QueryService> =
            Arc::new(WriteGate::new(backend, Arc::clone(&flag_store)));
        Self {
            backend: gated,
            flag_store,
        }
    }
}
