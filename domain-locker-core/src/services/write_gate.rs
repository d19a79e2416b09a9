//! 写入门禁装饰器
//!
//! 包装任意 `QueryService`，在写操作到达后端之前检查写权限开关。
//! 读操作直接透传，不触碰开关存储。

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use domain_locker_backend::{
    BackendError, Domain, DomainCosting, DomainUpdate, Host, HostDomainCount,
    NotificationPreference, QueryService, Result, SaveDomainRequest, StatusSummary,
    SubdomainGroup, Tag, UptimeCheck,
};

use crate::traits::{FLAG_WRITE_PERMISSIONS, FeatureFlagStore};

/// 默认写操作集合（`QueryService` 的全部变更方法）
pub const WRITE_OPERATIONS: &[&str] = &[
    "save_domain",
    "update_domain",
    "delete_domain",
    "save_tags",
    "create_tag",
    "update_tag",
    "delete_tag",
    "save_host",
    "delete_host",
    "update_domain_costing",
    "record_uptime_check",
    "set_notification_preference",
];

/// 写入门禁
///
/// 写操作集合在构造时固定，之后不再变化；开关值则在每次写操作时
/// 现查（开关翻转与在途调用之间存在时间窗，属预期行为）。
/// 拒绝时返回 [`BackendError::WritesDisabled`]，后端完全不被调用。
pub struct WriteGate {
    inner: Arc<dyn QueryService>,
    flags: Arc<dyn FeatureFlagStore>,
    write_set: HashSet<&'static str>,
}

impl WriteGate {
    /// 用默认写操作集合包装后端
    #[must_use]
    pub fn new(inner: Arc<dyn QueryService>, flags: Arc<dyn FeatureFlagStore>) -> Self {
        Self::with_write_set(inner, flags, WRITE_OPERATIONS)
    }

    /// 用自定义写操作集合包装后端
    ///
    /// 不在集合内的操作（包括变更方法）直接透传。
    #[must_use]
    pub fn with_write_set(
        inner: Arc<dyn QueryService>,
        flags: Arc<dyn FeatureFlagStore>,
        operations: &[&'static str],
    ) -> Self {
        Self {
            inner,
            flags,
            write_set: operations.iter().copied().collect(),
        }
    }

    /// 检查某操作是否会被当作写操作门禁
    #[must_use]
    pub fn is_gated(&self, operation: &str) -> bool {
        self.write_set.contains(operation)
    }

    async fn ensure_writable(&self, operation: &'static str) -> Result<()> {
        if !self.write_set.contains(operation) {
            return Ok(());
        }
        if self.flags.is_enabled(FLAG_WRITE_PERMISSIONS).await {
            return Ok(());
        }
        log::warn!("[write-gate] 拒绝写操作: {operation}");
        Err(BackendError::WritesDisabled {
            operation: operation.to_string(),
        })
    }
}

#[async_trait]
impl QueryService for WriteGate {
    fn id(&self) -> &'static str {
        self.inner.id()
    }

    async fn validate_connection(&self) -> Result<bool> {
        self.inner.validate_connection().await
    }

    // ===== 读操作：直接透传 =====

    async fn list_domains(&self) -> Result<Vec<Domain>> {
        self.inner.list_domains().await
    }

    async fn get_domain(&self, domain_name: &str) -> Result<Domain> {
        self.inner.get_domain(domain_name).await
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        self.inner.list_tags().await
    }

    async fn domains_by_tag(&self, tag: &str) -> Result<Vec<Domain>> {
        self.inner.domains_by_tag(tag).await
    }

    async fn list_hosts(&self) -> Result<Vec<Host>> {
        self.inner.list_hosts().await
    }

    async fn hosts_with_domain_counts(&self) -> Result<Vec<HostDomainCount>> {
        self.inner.hosts_with_domain_counts().await
    }

    async fn get_domain_costings(&self) -> Result<Vec<DomainCosting>> {
        self.inner.get_domain_costings().await
    }

    async fn status_summary(&self) -> Result<Vec<StatusSummary>> {
        self.inner.status_summary().await
    }

    async fn list_subdomains(&self) -> Result<Vec<SubdomainGroup>> {
        self.inner.list_subdomains().await
    }

    async fn uptime_history(&self, domain_name: &str, limit: u32) -> Result<Vec<UptimeCheck>> {
        self.inner.uptime_history(domain_name, limit).await
    }

    async fn notification_preferences(
        &self,
        domain_name: &str,
    ) -> Result<Vec<NotificationPreference>> {
        self.inner.notification_preferences(domain_name).await
    }

    // ===== 写操作：先过门禁 =====

    async fn save_domain(&self, req: &SaveDomainRequest) -> Result<Domain> {
        self.ensure_writable("save_domain").await?;
        self.inner.save_domain(req).await
    }

    async fn update_domain(&self, domain_name: &str, update: &DomainUpdate) -> Result<Domain> {
        self.ensure_writable("update_domain").await?;
        self.inner.update_domain(domain_name, update).await
    }

    async fn delete_domain(&self, domain_name: &str) -> Result<()> {
        self.ensure_writable("delete_domain").await?;
        self.inner.delete_domain(domain_name).await
    }

    async fn save_tags(&self, domain_name: &str, tags: &[String]) -> Result<()> {
        self.ensure_writable("save_tags").await?;
        self.inner.save_tags(domain_name, tags).await
    }

    async fn create_tag(&self, tag: &Tag) -> Result<Tag> {
        self.ensure_writable("create_tag").await?;
        self.inner.create_tag(tag).await
    }

    async fn update_tag(&self, name: &str, tag: &Tag) -> Result<Tag> {
        self.ensure_writable("update_tag").await?;
        self.inner.update_tag(name, tag).await
    }

    async fn delete_tag(&self, name: &str) -> Result<()> {
        self.ensure_writable("delete_tag").await?;
        self.inner.delete_tag(name).await
    }

    async fn save_host(&self, domain_name: &str, host: &Host) -> Result<Host> {
        self.ensure_writable("save_host").await?;
        self.inner.save_host(domain_name, host).await
    }

    async fn delete_host(&self, isp: &str) -> Result<()> {
        self.ensure_writable("delete_host").await?;
        self.inner.delete_host(isp).await
    }

    async fn update_domain_costing(&self, costing: &DomainCosting) -> Result<DomainCosting> {
        self.ensure_writable("update_domain_costing").await?;
        self.inner.update_domain_costing(costing).await
    }

    async fn record_uptime_check(&self, domain_name: &str, check: &UptimeCheck) -> Result<()> {
        self.ensure_writable("record_uptime_check").await?;
        self.inner.record_uptime_check(domain_name, check).await
    }

    async fn set_notification_preference(
        &self,
        domain_name: &str,
        channel: &str,
        enabled: bool,
    ) -> Result<()> {
        self.ensure_writable("set_notification_preference").await?;
        self.inner
            .set_notification_preference(domain_name, channel, enabled)
            .await
    }
}
