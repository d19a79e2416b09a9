//! 主机（托管商）管理服务

use std::sync::Arc;

use domain_locker_backend::{Host, HostDomainCount, QueryService};

use crate::error::{CoreError, CoreResult};

/// 主机管理服务
///
/// 主机按 ISP 名称去重，关联到域名时由后端做 lookup-or-create。
pub struct HostService {
    backend: Arc<dyn QueryService>,
}

impl HostService {
    /// 创建主机服务实例
    #[must_use]
    pub fn new(backend: Arc<dyn QueryService>) -> Self {
        Self { backend }
    }

    /// 列出全部主机
    pub async fn list_hosts(&self) -> CoreResult<Vec<Host>> {
        Ok(self.backend.list_hosts().await?)
    }

    /// 各主机关联的域名数（计数降序）
    pub async fn hosts_with_domain_counts(&self) -> CoreResult<Vec<HostDomainCount>> {
        Ok(self.backend.hosts_with_domain_counts().await?)
    }

    /// 将主机关联到域名
    pub async fn attach_host(&self, domain_name: &str, host: Host) -> CoreResult<Host> {
        if host.isp.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "host ISP must not be empty".to_string(),
            ));
        }
        Ok(self.backend.save_host(domain_name, &host).await?)
    }

    /// 按 ISP 删除主机（不存在时静默成功）
    pub async fn remove_host(&self, isp: &str) -> CoreResult<()> {
        Ok(self.backend.delete_host(isp).await?)
    }
}
