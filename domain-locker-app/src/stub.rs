//! 错误会话使用的占位后端

use async_trait::async_trait;

use domain_locker_backend::{
    BackendError, Domain, DomainCosting, DomainUpdate, Host, HostDomainCount,
    NotificationPreference, QueryService, Result, SaveDomainRequest, StatusSummary,
    SubdomainGroup, Tag, UptimeCheck,
};

/// 所有操作都返回 `NotConfigured` 的后端
///
/// 让错误会话下的应用保持可启动：路由层看到错误即重定向到错误页，
/// 不需要在每个调用点判空。
pub(crate) struct StubBackend;

fn not_configured<T>() -> Result<T> {
    Err(BackendError::NotConfigured {
        detail: "no database backend configured".to_string(),
    })
}

#[async_trait]
impl QueryService for StubBackend {
    fn id(&self) -> &'static str {
        "stub"
    }

    async fn validate_connection(&self) -> Result<bool> {
        Ok(false)
    }

    async fn list_domains(&self) -> Result<Vec<Domain>> {
        not_configured()
    }

    async fn get_domain(&self, _domain_name: &str) -> Result<Domain> {
        not_configured()
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        not_configured()
    }

    async fn domains_by_tag(&self, _tag: &str) -> Result<Vec<Domain>> {
        not_configured()
    }

    async fn list_hosts(&self) -> Result<Vec<Host>> {
        not_configured()
    }

    async fn hosts_with_domain_counts(&self) -> Result<Vec<HostDomainCount>> {
        not_configured()
    }

    async fn get_domain_costings(&self) -> Result<Vec<DomainCosting>> {
        not_configured()
    }

    async fn status_summary(&self) -> Result<Vec<StatusSummary>> {
        not_configured()
    }

    async fn list_subdomains(&self) -> Result<Vec<SubdomainGroup>> {
        not_configured()
    }

    async fn uptime_history(&self, _domain_name: &str, _limit: u32) -> Result<Vec<UptimeCheck>> {
        not_configured()
    }

    async fn notification_preferences(
        &self,
        _domain_name: &str,
    ) -> Result<Vec<NotificationPreference>> {
        not_configured()
    }

    async fn save_domain(&self, _req: &SaveDomainRequest) -> Result<Domain> {
        not_configured()
    }

    async fn update_domain(&self, _domain_name: &str, _update: &DomainUpdate) -> Result<Domain> {
        not_configured()
    }

    async fn delete_domain(&self, _domain_name: &str) -> Result<()> {
        not_configured()
    }

    async fn save_tags(&self, _domain_name: &str, _tags: &[String]) -> Result<()> {
        not_configured()
    }

    async fn create_tag(&self, _tag: &Tag) -> Result<Tag> {
        not_configured()
    }

    async fn update_tag(&self, _name: &str, _tag: &Tag) -> Result<Tag> {
        not_configured()
    }

    async fn delete_tag(&self, _name: &str) -> Result<()> {
        not_configured()
    }

    async fn save_host(&self, _domain_name: &str, _host: &Host) -> Result<Host> {
        not_configured()
    }

    async fn delete_host(&self, _isp: &str) -> Result<()> {
        not_configured()
    }

    async fn update_domain_costing(&self, _costing: &DomainCosting) -> Result<DomainCosting> {
        not_configured()
    }

    async fn record_uptime_check(&self, _domain_name: &str, _check: &UptimeCheck) -> Result<()> {
        not_configured()
    }

    async fn set_notification_preference(
        &self,
        _domain_name: &str,
        _channel: &str,
        _enabled: bool,
    ) -> Result<()> {
        not_configured()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_rejects_reads_and_writes() {
        let stub = StubBackend;
        assert!(matches!(
            stub.list_domains().await.unwrap_err(),
            BackendError::NotConfigured { .. }
        ));
        assert!(matches!(
            stub.delete_domain("example.com").await.unwrap_err(),
            BackendError::NotConfigured { .. }
        ));
        assert!(!stub.validate_connection().await.unwrap());
    }
}
