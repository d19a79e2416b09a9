//! 域名组合管理服务
//!
//! 在后端之上做输入校验与过期计算，校验失败的请求不会到达后端。

use std::sync::Arc;

use chrono::Utc;
use domain_locker_backend::{Domain, DomainUpdate, QueryService, SaveDomainRequest};

use crate::error::{CoreError, CoreResult};

/// 备注长度上限（字符数）
const MAX_NOTE_LENGTH: usize = 500;

/// 域名组合管理服务
pub struct DomainService {
    backend: Arc<dyn QueryService>,
}

impl DomainService {
    /// 创建域名服务实例
    #[must_use]
    pub fn new(backend: Arc<dyn QueryService>) -> Self {
        Self { backend }
    }

    /// 列出全部域名
    pub async fn list_domains(&self) -> CoreResult<Vec<Domain>> {
        Ok(self.backend.list_domains().await?)
    }

    /// 获取单个域名
    pub async fn get_domain(&self, domain_name: &str) -> CoreResult<Domain> {
        Ok(self.backend.get_domain(domain_name).await?)
    }

    /// 添加域名（先校验再落库，域名统一转为小写）
    pub async fn add_domain(&self, mut req: SaveDomainRequest) -> CoreResult<Domain> {
        req.domain_name = normalize_domain_name(&req.domain_name)?;
        if let Some(ref notes) = req.notes {
            validate_notes(notes)?;
        }
        Ok(self.backend.save_domain(&req).await?)
    }

    /// 部分更新域名
    pub async fn update_domain(
        &self,
        domain_name: &str,
        update: DomainUpdate,
    ) -> CoreResult<Domain> {
        let name = normalize_domain_name(domain_name)?;
        if let Some(Some(ref notes)) = update.notes {
            validate_notes(notes)?;
        }
        Ok(self.backend.update_domain(&name, &update).await?)
    }

    /// 删除域名
    pub async fn remove_domain(&self, domain_name: &str) -> CoreResult<()> {
        let name = normalize_domain_name(domain_name)?;
        Ok(self.backend.delete_domain(&name).await?)
    }

    /// 全量替换标签（标签名去重、去空白）
    pub async fn set_tags(&self, domain_name: &str, tags: Vec<String>) -> CoreResult<()> {
        let name = normalize_domain_name(domain_name)?;
        let mut cleaned: Vec<String> = tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        cleaned.sort();
        cleaned.dedup();
        Ok(self.backend.save_tags(&name, &cleaned).await?)
    }

    /// 列出 N 天内到期的域名（按剩余天数升序）
    ///
    /// 没有过期日的域名不参与计算；已过期的域名（剩余为负）包含在内。
    pub async fn domains_expiring_within(&self, days: i64) -> CoreResult<Vec<(Domain, i64)>> {
        let now = Utc::now();
        let mut expiring: Vec<(Domain, i64)> = self
            .backend
            .list_domains()
            .await?
            .into_iter()
            .filter_map(|d| {
                let remaining = d.days_until_expiry(now)?;
                (remaining <= days).then_some((d, remaining))
            })
            .collect();
        expiring.sort_by_key(|(_, remaining)| *remaining);
        Ok(expiring)
    }
}

/// 校验并规范化域名（小写、去首尾空白）
///
/// 要求至少两级标签，标签由字母数字和连字符构成，连字符不得出现在标签首尾。
fn normalize_domain_name(raw: &str) -> CoreResult<String> {
    let name = raw.trim().to_lowercase();
    if name.is_empty() {
        return Err(CoreError::ValidationError(
            "domain name must not be empty".to_string(),
        ));
    }
    if name.len() > 253 {
        return Err(CoreError::ValidationError(format!(
            "domain name too long: {} characters",
            name.len()
        )));
    }
    let labels: Vec<&str> = name.split('.').collect();
    if labels.len() < 2 {
        return Err(CoreError::ValidationError(format!(
            "not a fully qualified domain name: '{name}'"
        )));
    }
    for label in &labels {
        let valid = !label.is_empty()
            && label.len() <= 63
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-');
        if !valid {
            return Err(CoreError::ValidationError(format!(
                "invalid domain label: '{label}'"
            )));
        }
    }
    Ok(name)
}

fn validate_notes(notes: &str) -> CoreResult<()> {
    let count = notes.chars().count();
    if count > MAX_NOTE_LENGTH {
        return Err(CoreError::ValidationError(format!(
            "notes exceed {MAX_NOTE_LENGTH} characters (got {count})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockQueryService, domain_expiring_in};

    fn service() -> (DomainService, Arc<MockQueryService>) {
        let mock = Arc::new(MockQueryService::new());
        (DomainService::new(Arc::clone(&mock) as _), mock)
    }

    fn request(name: &str) -> SaveDomainRequest {
        SaveDomainRequest {
            domain_name: name.to_string(),
            registrar: None,
            expiry_date: None,
            notes: None,
            tags: Vec::new(),
        }
    }

    #[tokio::test]
    async fn add_domain_normalizes_to_lowercase() {
        let (service, mock) = service();
        let created = service.add_domain(request("  Example.COM ")).await.unwrap();
        assert_eq!(created.domain_name, "example.com");
        assert_eq!(mock.calls("save_domain").await, 1);
    }

    #[tokio::test]
    async fn add_domain_rejects_bare_label() {
        let (service, mock) = service();
        let err = service.add_domain(request("localhost")).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
        // 校验失败不触达后端
        assert_eq!(mock.total_calls().await, 0);
    }

    #[tokio::test]
    async fn add_domain_rejects_bad_label_chars() {
        let (service, _) = service();
        for bad in ["exa mple.com", "-leading.com", "trailing-.com", "a..com"] {
            let err = service.add_domain(request(bad)).await.unwrap_err();
            assert!(matches!(err, CoreError::ValidationError(_)), "{bad}");
        }
    }

    #[tokio::test]
    async fn add_domain_rejects_long_notes() {
        let (service, _) = service();
        let mut req = request("example.com");
        req.notes = Some("x".repeat(501));
        let err = service.add_domain(req).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[tokio::test]
    async fn notes_at_limit_are_accepted() {
        let (service, _) = service();
        let mut req = request("example.com");
        req.notes = Some("好".repeat(500)); // 按字符计数而非字节
        assert!(service.add_domain(req).await.is_ok());
    }

    #[tokio::test]
    async fn set_tags_dedups_and_trims() {
        let (service, _mock) = service();
        service.add_domain(request("example.com")).await.unwrap();
        service
            .set_tags(
                "example.com",
                vec![
                    " prod ".to_string(),
                    "prod".to_string(),
                    String::new(),
                    "dev".to_string(),
                ],
            )
            .await
            .unwrap();
        let domain = service.get_domain("example.com").await.unwrap();
        assert_eq!(domain.tags, vec!["dev", "prod"]);
    }

    #[tokio::test]
    async fn expiring_within_sorts_and_filters() {
        let (service, mock) = service();
        mock.seed_domain(domain_expiring_in("soon.com", 5)).await;
        mock.seed_domain(domain_expiring_in("later.com", 60)).await;
        mock.seed_domain(domain_expiring_in("overdue.com", -3)).await;
        mock.seed_domain(Domain::with_name("no-expiry.com")).await;

        let expiring = service.domains_expiring_within(30).await.unwrap();
        let names: Vec<&str> = expiring
            .iter()
            .map(|(d, _)| d.domain_name.as_str())
            .collect();
        assert_eq!(names, vec!["overdue.com", "soon.com"]);
    }
}
