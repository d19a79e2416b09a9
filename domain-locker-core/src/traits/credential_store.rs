//! 凭证存储抽象 Trait

use async_trait::async_trait;
use domain_locker_backend::BackendCredentials;

use crate::error::CoreResult;

/// 后端凭证存储 Trait
///
/// 平台实现:
/// - 自托管部署: `FileCredentialStore`（JSON 配置文件）
/// - 托管部署: 环境变量注入
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// 加载后端凭证
    ///
    /// # Returns
    /// * `Ok(Some(credentials))` - 已配置
    /// * `Ok(None)` - 未配置任何后端
    async fn load(&self) -> CoreResult<Option<BackendCredentials>>;

    /// 持久化后端凭证
    async fn save(&self, credentials: &BackendCredentials) -> CoreResult<()>;
}
