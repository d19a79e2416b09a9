//! 测试辅助模块
//!
//! 提供 mock 实现和便捷的测试工厂方法。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use domain_locker_backend::{
    BackendError, Domain, DomainCosting, DomainUpdate, Host, HostDomainCount,
    NotificationPreference, QueryService, Result, SaveDomainRequest, StatusSummary,
    SubdomainGroup, Tag, UptimeCheck,
};

use crate::traits::FeatureFlagStore;

// ===== MockQueryService =====

/// 内存后端 mock：记录每个操作的调用次数，写操作作用于内存状态
pub struct MockQueryService {
    domains: RwLock<HashMap<String, Domain>>,
    tags: RwLock<HashMap<String, Tag>>,
    hosts: RwLock<HashMap<String, Host>>,
    uptime: RwLock<Vec<(String, UptimeCheck)>>,
    call_counts: RwLock<HashMap<String, usize>>,
    /// 如果 Some，所有操作返回此错误（用于测试错误路径）
    fail_with: RwLock<Option<BackendError>>,
}

impl MockQueryService {
    pub fn new() -> Self {
        Self {
            domains: RwLock::new(HashMap::new()),
            tags: RwLock::new(HashMap::new()),
            hosts: RwLock::new(HashMap::new()),
            uptime: RwLock::new(Vec::new()),
            call_counts: RwLock::new(HashMap::new()),
            fail_with: RwLock::new(None),
        }
    }

    /// 预置域名记录
    pub async fn seed_domain(&self, domain: Domain) {
        self.domains
            .write()
            .await
            .insert(domain.domain_name.clone(), domain);
    }

    pub async fn set_fail_with(&self, error: Option<BackendError>) {
        *self.fail_with.write().await = error;
    }

    /// 某操作被调用的次数
    pub async fn calls(&self, operation: &str) -> usize {
        self.call_counts
            .read()
            .await
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    /// 全部操作调用次数之和
    pub async fn total_calls(&self) -> usize {
        self.call_counts.read().await.values().sum()
    }

    /// 已记录的健康检查条目
    pub async fn recorded_checks(&self) -> Vec<(String, UptimeCheck)> {
        self.uptime.read().await.clone()
    }

    async fn record(&self, operation: &str) -> Result<()> {
        *self
            .call_counts
            .write()
            .await
            .entry(operation.to_string())
            .or_insert(0) += 1;
        match self.fail_with.read().await.clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn not_found(domain: &str) -> BackendError {
        BackendError::DomainNotFound {
            backend: "mock".to_string(),
            domain: domain.to_string(),
        }
    }
}

impl Default for MockQueryService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryService for MockQueryService {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn validate_connection(&self) -> Result<bool> {
        self.record("validate_connection").await?;
        Ok(true)
    }

    async fn list_domains(&self) -> Result<Vec<Domain>> {
        self.record("list_domains").await?;
        let mut domains: Vec<Domain> = self.domains.read().await.values().cloned().collect();
        domains.sort_by(|a, b| a.domain_name.cmp(&b.domain_name));
        Ok(domains)
    }

    async fn get_domain(&self, domain_name: &str) -> Result<Domain> {
        self.record("get_domain").await?;
        self.domains
            .read()
            .await
            .get(domain_name)
            .cloned()
            .ok_or_else(|| Self::not_found(domain_name))
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        self.record("list_tags").await?;
        let mut tags: Vec<Tag> = self.tags.read().await.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn domains_by_tag(&self, tag: &str) -> Result<Vec<Domain>> {
        self.record("domains_by_tag").await?;
        Ok(self
            .domains
            .read()
            .await
            .values()
            .filter(|d| d.tags.iter().any(|t| t == tag))
            .cloned()
            .collect())
    }

    async fn list_hosts(&self) -> Result<Vec<Host>> {
        self.record("list_hosts").await?;
        Ok(self.hosts.read().await.values().cloned().collect())
    }

    async fn hosts_with_domain_counts(&self) -> Result<Vec<HostDomainCount>> {
        self.record("hosts_with_domain_counts").await?;
        let domains = self.domains.read().await;
        let counts: HashMap<String, usize> =
            domains
                .values()
                .filter_map(|d| d.host.as_ref())
                .fold(HashMap::new(), |mut acc, h| {
                    *acc.entry(h.isp.clone()).or_insert(0) += 1;
                    acc
                });
        Ok(self
            .hosts
            .read()
            .await
            .values()
            .map(|host| HostDomainCount {
                domain_count: counts.get(&host.isp).copied().unwrap_or(0),
                host: host.clone(),
            })
            .collect())
    }

    async fn get_domain_costings(&self) -> Result<Vec<DomainCosting>> {
        self.record("get_domain_costings").await?;
        Ok(Vec::new())
    }

    async fn status_summary(&self) -> Result<Vec<StatusSummary>> {
        self.record("status_summary").await?;
        Ok(Vec::new())
    }

    async fn list_subdomains(&self) -> Result<Vec<SubdomainGroup>> {
        self.record("list_subdomains").await?;
        Ok(Vec::new())
    }

    async fn uptime_history(&self, domain_name: &str, limit: u32) -> Result<Vec<UptimeCheck>> {
        self.record("uptime_history").await?;
        let uptime = self.uptime.read().await;
        let mut checks: Vec<UptimeCheck> = uptime
            .iter()
            .filter(|(name, _)| name == domain_name)
            .map(|(_, check)| check.clone())
            .collect();
        checks.sort_by(|a, b| b.checked_at.cmp(&a.checked_at));
        checks.truncate(limit as usize);
        Ok(checks)
    }

    async fn notification_preferences(
        &self,
        domain_name: &str,
    ) -> Result<Vec<NotificationPreference>> {
        self.record("notification_preferences").await?;
        self.domains
            .read()
            .await
            .get(domain_name)
            .map(|d| d.notifications.clone())
            .ok_or_else(|| Self::not_found(domain_name))
    }

    async fn save_domain(&self, req: &SaveDomainRequest) -> Result<Domain> {
        self.record("save_domain").await?;
        let mut domain = Domain::with_name(&req.domain_name);
        domain.registrar = req.registrar.clone();
        domain.expiry_date = req.expiry_date;
        domain.notes = req.notes.clone();
        domain.tags = req.tags.clone();
        self.domains
            .write()
            .await
            .insert(domain.domain_name.clone(), domain.clone());
        Ok(domain)
    }

    async fn update_domain(&self, domain_name: &str, update: &DomainUpdate) -> Result<Domain> {
        self.record("update_domain").await?;
        let mut domains = self.domains.write().await;
        let domain = domains
            .get_mut(domain_name)
            .ok_or_else(|| Self::not_found(domain_name))?;
        if let Some(registrar) = &update.registrar {
            domain.registrar = Some(registrar.clone());
        }
        if let Some(expiry) = &update.expiry_date {
            domain.expiry_date = Some(*expiry);
        }
        if let Some(notes) = &update.notes {
            domain.notes = notes.clone();
        }
        Ok(domain.clone())
    }

    async fn delete_domain(&self, domain_name: &str) -> Result<()> {
        self.record("delete_domain").await?;
        self.domains
            .write()
            .await
            .remove(domain_name)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(domain_name))
    }

    async fn save_tags(&self, domain_name: &str, tags: &[String]) -> Result<()> {
        self.record("save_tags").await?;
        let mut domains = self.domains.write().await;
        let domain = domains
            .get_mut(domain_name)
            .ok_or_else(|| Self::not_found(domain_name))?;
        domain.tags = tags.to_vec();
        Ok(())
    }

    async fn create_tag(&self, tag: &Tag) -> Result<Tag> {
        self.record("create_tag").await?;
        self.tags
            .write()
            .await
            .insert(tag.name.clone(), tag.clone());
        Ok(tag.clone())
    }

    async fn update_tag(&self, name: &str, tag: &Tag) -> Result<Tag> {
        self.record("update_tag").await?;
        let mut tags = self.tags.write().await;
        if tags.remove(name).is_none() {
            return Err(BackendError::TagNotFound {
                backend: "mock".to_string(),
                tag: name.to_string(),
            });
        }
        tags.insert(tag.name.clone(), tag.clone());
        Ok(tag.clone())
    }

    async fn delete_tag(&self, name: &str) -> Result<()> {
        self.record("delete_tag").await?;
        self.tags.write().await.remove(name);
        Ok(())
    }

    async fn save_host(&self, domain_name: &str, host: &Host) -> Result<Host> {
        self.record("save_host").await?;
        let mut domains = self.domains.write().await;
        let domain = domains
            .get_mut(domain_name)
            .ok_or_else(|| Self::not_found(domain_name))?;
        domain.host = Some(host.clone());
        self.hosts
            .write()
            .await
            .insert(host.isp.clone(), host.clone());
        Ok(host.clone())
    }

    async fn delete_host(&self, isp: &str) -> Result<()> {
        self.record("delete_host").await?;
        self.hosts.write().await.remove(isp);
        Ok(())
    }

    async fn update_domain_costing(&self, costing: &DomainCosting) -> Result<DomainCosting> {
        self.record("update_domain_costing").await?;
        Ok(costing.clone())
    }

    async fn record_uptime_check(&self, domain_name: &str, check: &UptimeCheck) -> Result<()> {
        self.record("record_uptime_check").await?;
        if !self.domains.read().await.contains_key(domain_name) {
            return Err(Self::not_found(domain_name));
        }
        self.uptime
            .write()
            .await
            .push((domain_name.to_string(), check.clone()));
        Ok(())
    }

    async fn set_notification_preference(
        &self,
        domain_name: &str,
        channel: &str,
        enabled: bool,
    ) -> Result<()> {
        self.record("set_notification_preference").await?;
        let mut domains = self.domains.write().await;
        let domain = domains
            .get_mut(domain_name)
            .ok_or_else(|| Self::not_found(domain_name))?;
        match domain
            .notifications
            .iter_mut()
            .find(|n| n.notification_type == channel)
        {
            Some(pref) => pref.is_enabled = enabled,
            None => domain.notifications.push(NotificationPreference {
                notification_type: channel.to_string(),
                is_enabled: enabled,
            }),
        }
        Ok(())
    }
}

// ===== MockFlagStore =====

/// 内存开关 mock：记录查询次数，可在测试中翻转
pub struct MockFlagStore {
    flags: RwLock<HashMap<String, bool>>,
    lookup_count: RwLock<usize>,
}

impl MockFlagStore {
    pub fn new() -> Self {
        Self {
            flags: RwLock::new(HashMap::new()),
            lookup_count: RwLock::new(0),
        }
    }

    pub fn with_flag(flag: &str, enabled: bool) -> Self {
        let mut flags = HashMap::new();
        flags.insert(flag.to_string(), enabled);
        Self {
            flags: RwLock::new(flags),
            lookup_count: RwLock::new(0),
        }
    }

    pub async fn set(&self, flag: &str, enabled: bool) {
        self.flags.write().await.insert(flag.to_string(), enabled);
    }

    /// 开关被查询的总次数
    pub async fn lookups(&self) -> usize {
        *self.lookup_count.read().await
    }
}

impl Default for MockFlagStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeatureFlagStore for MockFlagStore {
    async fn is_enabled(&self, flag: &str) -> bool {
        *self.lookup_count.write().await += 1;
        self.flags.read().await.get(flag).copied().unwrap_or(false)
    }
}

/// 构造带过期日的域名记录
pub fn domain_expiring_in(name: &str, days: i64) -> Domain {
    let mut domain = Domain::with_name(name);
    domain.expiry_date = Some(chrono::Utc::now() + chrono::Duration::days(days));
    domain
}
