//! Supabase QueryService trait 实现
//!
//! 能用 PostgREST 过滤器/嵌套资源表达的查询直接下推；
//! REST 接口表达不了的聚合（主机计数、状态分组）在内存中完成，
//! 输出顺序与 Postgres 后端的 ORDER BY 保持一致。

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{BackendError, Result};
use crate::traits::{BackendErrorMapper, QueryService};
use crate::types::{
    Domain, DomainCosting, DomainUpdate, Host, HostDomainCount, NotificationPreference,
    SaveDomainRequest, StatusSummary, Subdomain, SubdomainGroup, Tag, UptimeCheck,
};

use super::http::eq_filter;
use super::{SupabaseBackend, rows};

/// `domains` 关系的嵌套 select 参数
const DOMAIN_SELECT: &str = "domain_name,expiry_date,registration_date,updated_date,notes,\
registrars(name,id,url),domain_tags(tags(name)),domain_links(link_name,link_url),\
sub_domains(name,sd_info),ip_addresses(ip_address,is_ipv6),\
ssl_certificates(issuer,issuer_country,valid_from,valid_to,subject,key_size),\
whois_info(name,organization,country,state,city,postal_code),\
domain_hosts(hosts(isp,org,as_number,city,region,country,lat,lon)),\
domain_statuses(status_code),notification_preferences(notification_type,is_enabled)";

/// 将任意主键值转为 `eq.` 过滤器（uuid 字符串或整型序号均可）
fn value_filter(column: &str, value: &Value) -> String {
    let s = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    eq_filter(column, &s)
}

/// 按 ISP 分组统计主机关联域名数（零关联主机计 0）
fn group_host_counts(hosts: Vec<Host>, linked_isps: &[String]) -> Vec<HostDomainCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for isp in linked_isps {
        *counts.entry(isp.as_str()).or_insert(0) += 1;
    }
    let mut out: Vec<HostDomainCount> = hosts
        .into_iter()
        .map(|host| {
            let domain_count = counts.get(host.isp.as_str()).copied().unwrap_or(0);
            HostDomainCount { host, domain_count }
        })
        .collect();
    // 与 Postgres 后端一致：计数降序，再按 ISP 名
    out.sort_by(|a, b| {
        b.domain_count
            .cmp(&a.domain_count)
            .then_with(|| a.host.isp.cmp(&b.host.isp))
    });
    out
}

/// 按 EPP 状态码分组（计数降序）
fn group_statuses(pairs: Vec<(String, String)>) -> Vec<StatusSummary> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (status_code, domain_name) in pairs {
        grouped.entry(status_code).or_default().push(domain_name);
    }
    let mut out: Vec<StatusSummary> = grouped
        .into_iter()
        .map(|(status_code, mut domains)| {
            domains.sort();
            StatusSummary {
                status_code,
                domain_count: domains.len(),
                domains,
            }
        })
        .collect();
    out.sort_by(|a, b| b.domain_count.cmp(&a.domain_count));
    out
}

/// 按父域名分组子域名
fn group_subdomains(pairs: Vec<(String, Subdomain)>) -> Vec<SubdomainGroup> {
    let mut grouped: BTreeMap<String, Vec<Subdomain>> = BTreeMap::new();
    for (domain, subdomain) in pairs {
        grouped.entry(domain).or_default().push(subdomain);
    }
    grouped
        .into_iter()
        .map(|(domain, mut subdomains)| {
            subdomains.sort_by(|a, b| a.name.cmp(&b.name));
            SubdomainGroup { domain, subdomains }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct SbUptimeRow {
    checked_at: DateTime<Utc>,
    is_up: bool,
    #[serde(default)]
    response_code: Option<u16>,
    #[serde(default)]
    response_time_ms: Option<f64>,
    #[serde(default)]
    dns_lookup_time_ms: Option<f64>,
    #[serde(default)]
    ssl_handshake_time_ms: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SbTagRow {
    name: String,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    icon: Option<String>,
}

impl From<SbTagRow> for Tag {
    fn from(row: SbTagRow) -> Self {
        Self {
            name: row.name,
            color: row.color.unwrap_or_else(|| "grey".to_string()),
            icon: row.icon,
        }
    }
}

impl SupabaseBackend {
    /// 查域名主键，不存在返回 `DomainNotFound`
    async fn domain_id(&self, domain_name: &str) -> Result<Value> {
        let rows = self
            .rest_get(
                "domains",
                &format!("select=id&{}", eq_filter("domain_name", domain_name)),
            )
            .await?;
        rows.first()
            .and_then(|r| r.get("id"))
            .cloned()
            .ok_or_else(|| BackendError::DomainNotFound {
                backend: self.backend_name().to_string(),
                domain: domain_name.to_string(),
            })
    }

    /// 查注册商主键，不存在则创建
    async fn registrar_id(&self, name: &str, url: Option<&str>) -> Result<Value> {
        let rows = self
            .rest_get("registrars", &format!("select=id&{}", eq_filter("name", name)))
            .await?;
        if let Some(id) = rows.first().and_then(|r| r.get("id")) {
            return Ok(id.clone());
        }
        let created = self
            .rest_post("registrars", &json!({ "name": name, "url": url }))
            .await?;
        created
            .first()
            .and_then(|r| r.get("id"))
            .cloned()
            .ok_or_else(|| self.parse_error("registrars insert: 无返回行"))
    }

    /// 查标签主键，不存在则创建
    async fn tag_id(&self, name: &str) -> Result<Value> {
        let rows = self
            .rest_get("tags", &format!("select=id&{}", eq_filter("name", name)))
            .await?;
        if let Some(id) = rows.first().and_then(|r| r.get("id")) {
            return Ok(id.clone());
        }
        let created = self.rest_post("tags", &json!({ "name": name })).await?;
        created
            .first()
            .and_then(|r| r.get("id"))
            .cloned()
            .ok_or_else(|| self.parse_error("tags insert: 无返回行"))
    }

    fn host_body(host: &Host) -> Value {
        json!({
            "isp": host.isp,
            "org": host.org,
            "as_number": host.as_number,
            "city": host.city,
            "region": host.region,
            "country": host.country,
            "lat": host.lat,
            "lon": host.lon,
        })
    }
}

#[async_trait]
impl QueryService for SupabaseBackend {
    fn id(&self) -> &'static str {
        "supabase"
    }

    async fn validate_connection(&self) -> Result<bool> {
        match self.rest_get("domains", "select=domain_name&limit=1").await {
            Ok(_) => Ok(true),
            Err(BackendError::InvalidCredentials { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn list_domains(&self) -> Result<Vec<Domain>> {
        let rows = self
            .rest_get(
                "domains",
                &format!("select={DOMAIN_SELECT}&order=domain_name.asc"),
            )
            .await?;
        rows.iter()
            .map(|row| rows::domain_from_row(row).map_err(|e| self.parse_error(e)))
            .collect()
    }

    async fn get_domain(&self, domain_name: &str) -> Result<Domain> {
        let rows = self
            .rest_get(
                "domains",
                &format!(
                    "select={DOMAIN_SELECT}&{}",
                    eq_filter("domain_name", domain_name)
                ),
            )
            .await?;
        let row = rows.first().ok_or_else(|| BackendError::DomainNotFound {
            backend: self.backend_name().to_string(),
            domain: domain_name.to_string(),
        })?;
        rows::domain_from_row(row).map_err(|e| self.parse_error(e))
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        let rows = self
            .rest_get("tags", "select=name,color,icon&order=name.asc")
            .await?;
        rows.iter()
            .map(|row| {
                serde_json::from_value::<SbTagRow>(row.clone())
                    .map(Tag::from)
                    .map_err(|e| self.parse_error(format!("tag row: {e}")))
            })
            .collect()
    }

    async fn domains_by_tag(&self, tag: &str) -> Result<Vec<Domain>> {
        // PostgREST 的嵌套内连接过滤不稳定，改为全量拉取后在内存中过滤
        let domains = self.list_domains().await?;
        Ok(domains
            .into_iter()
            .filter(|d| d.tags.iter().any(|t| t == tag))
            .collect())
    }

    async fn list_hosts(&self) -> Result<Vec<Host>> {
        let rows = self
            .rest_get(
                "hosts",
                "select=isp,org,as_number,city,region,country,lat,lon&order=isp.asc",
            )
            .await?;
        rows.iter()
            .map(|row| rows::host_from_row(row).map_err(|e| self.parse_error(e)))
            .collect()
    }

    async fn hosts_with_domain_counts(&self) -> Result<Vec<HostDomainCount>> {
        let hosts = self.list_hosts().await?;
        let link_rows = self.rest_get("domain_hosts", "select=hosts(isp)").await?;
        let linked_isps: Vec<String> = link_rows
            .iter()
            .filter_map(|row| {
                row.get("hosts")
                    .and_then(|h| h.get("isp"))
                    .and_then(Value::as_str)
                    .map(ToString::to_string)
            })
            .collect();
        Ok(group_host_counts(hosts, &linked_isps))
    }

    async fn get_domain_costings(&self) -> Result<Vec<DomainCosting>> {
        let rows = self
            .rest_get(
                "domain_costings",
                "select=purchase_price,current_value,renewal_cost,auto_renew,domains(domain_name)",
            )
            .await?;
        let mut costings: Vec<DomainCosting> = rows
            .iter()
            .map(|row| rows::costing_from_row(row).map_err(|e| self.parse_error(e)))
            .collect::<Result<_>>()?;
        costings.sort_by(|a, b| a.domain_name.cmp(&b.domain_name));
        Ok(costings)
    }

    async fn status_summary(&self) -> Result<Vec<StatusSummary>> {
        let rows = self
            .rest_get("domain_statuses", "select=status_code,domains(domain_name)")
            .await?;
        let pairs: Vec<(String, String)> = rows
            .iter()
            .filter_map(|row| {
                let status = row.get("status_code")?.as_str()?.to_string();
                let domain = row.get("domains")?.get("domain_name")?.as_str()?.to_string();
                Some((status, domain))
            })
            .collect();
        Ok(group_statuses(pairs))
    }

    async fn list_subdomains(&self) -> Result<Vec<SubdomainGroup>> {
        let rows = self
            .rest_get("sub_domains", "select=name,sd_info,domains(domain_name)")
            .await?;
        let pairs: Vec<(String, Subdomain)> = rows
            .iter()
            .filter_map(|row| {
                let domain = row.get("domains")?.get("domain_name")?.as_str()?.to_string();
                let name = row.get("name")?.as_str()?.to_string();
                let sd_info = row
                    .get("sd_info")
                    .and_then(Value::as_str)
                    .map(ToString::to_string);
                Some((domain, Subdomain { name, sd_info }))
            })
            .collect();
        Ok(group_subdomains(pairs))
    }

    async fn uptime_history(&self, domain_name: &str, limit: u32) -> Result<Vec<UptimeCheck>> {
        let id = self.domain_id(domain_name).await?;
        let rows = self
            .rest_get(
                "uptime",
                &format!(
                    "select=checked_at,is_up,response_code,response_time_ms,\
                     dns_lookup_time_ms,ssl_handshake_time_ms&{}&order=checked_at.desc&limit={limit}",
                    value_filter("domain_id", &id)
                ),
            )
            .await?;
        rows.iter()
            .map(|row| {
                serde_json::from_value::<SbUptimeRow>(row.clone())
                    .map(|u| UptimeCheck {
                        checked_at: u.checked_at,
                        is_up: u.is_up,
                        response_code: u.response_code,
                        response_time_ms: u.response_time_ms,
                        dns_lookup_time_ms: u.dns_lookup_time_ms,
                        ssl_handshake_time_ms: u.ssl_handshake_time_ms,
                    })
                    .map_err(|e| self.parse_error(format!("uptime row: {e}")))
            })
            .collect()
    }

    async fn notification_preferences(
        &self,
        domain_name: &str,
    ) -> Result<Vec<NotificationPreference>> {
        let id = self.domain_id(domain_name).await?;
        let rows = self
            .rest_get(
                "notification_preferences",
                &format!(
                    "select=notification_type,is_enabled&{}&order=notification_type.asc",
                    value_filter("domain_id", &id)
                ),
            )
            .await?;
        rows.iter()
            .map(|row| {
                let notification_type = row
                    .get("notification_type")
                    .and_then(Value::as_str)
                    .map(ToString::to_string);
                let is_enabled = row.get("is_enabled").and_then(Value::as_bool);
                match (notification_type, is_enabled) {
                    (Some(notification_type), Some(is_enabled)) => Ok(NotificationPreference {
                        notification_type,
                        is_enabled,
                    }),
                    _ => Err(self.parse_error("notification row: 缺少字段")),
                }
            })
            .collect()
    }

    async fn save_domain(&self, req: &SaveDomainRequest) -> Result<Domain> {
        let registrar_id = match &req.registrar {
            Some(r) => Some(self.registrar_id(&r.name, r.url.as_deref()).await?),
            None => None,
        };

        self.rest_post(
            "domains",
            &json!({
                "domain_name": req.domain_name,
                "expiry_date": req.expiry_date,
                "notes": req.notes,
                "registrar_id": registrar_id,
            }),
        )
        .await?;

        if !req.tags.is_empty() {
            self.save_tags(&req.domain_name, &req.tags).await?;
        }

        self.get_domain(&req.domain_name).await
    }

    async fn update_domain(&self, domain_name: &str, update: &DomainUpdate) -> Result<Domain> {
        if update.is_empty() {
            return self.get_domain(domain_name).await;
        }

        let mut body = serde_json::Map::new();
        if let Some(registrar) = &update.registrar {
            let id = self
                .registrar_id(&registrar.name, registrar.url.as_deref())
                .await?;
            body.insert("registrar_id".to_string(), id);
        }
        if let Some(expiry) = &update.expiry_date {
            body.insert("expiry_date".to_string(), json!(expiry));
        }
        if let Some(notes) = &update.notes {
            body.insert("notes".to_string(), json!(notes));
        }
        body.insert("updated_date".to_string(), json!(Utc::now()));

        let rows = self
            .rest_patch(
                "domains",
                &eq_filter("domain_name", domain_name),
                &Value::Object(body),
            )
            .await?;
        if rows.is_empty() {
            return Err(BackendError::DomainNotFound {
                backend: self.backend_name().to_string(),
                domain: domain_name.to_string(),
            });
        }

        self.get_domain(domain_name).await
    }

    async fn delete_domain(&self, domain_name: &str) -> Result<()> {
        let rows = self
            .rest_delete("domains", &eq_filter("domain_name", domain_name))
            .await?;
        if rows.is_empty() {
            return Err(BackendError::DomainNotFound {
                backend: self.backend_name().to_string(),
                domain: domain_name.to_string(),
            });
        }
        Ok(())
    }

    async fn save_tags(&self, domain_name: &str, tags: &[String]) -> Result<()> {
        let domain_id = self.domain_id(domain_name).await?;

        self.rest_delete("domain_tags", &value_filter("domain_id", &domain_id))
            .await?;

        for tag in tags {
            let tag_id = self.tag_id(tag).await?;
            self.rest_post(
                "domain_tags",
                &json!({ "domain_id": domain_id, "tag_id": tag_id }),
            )
            .await?;
        }
        Ok(())
    }

    async fn create_tag(&self, tag: &Tag) -> Result<Tag> {
        let rows = self
            .rest_post(
                "tags",
                &json!({ "name": tag.name, "color": tag.color, "icon": tag.icon }),
            )
            .await?;
        let row = rows
            .first()
            .ok_or_else(|| self.parse_error("create_tag: 无返回行"))?;
        serde_json::from_value::<SbTagRow>(row.clone())
            .map(Tag::from)
            .map_err(|e| self.parse_error(format!("tag row: {e}")))
    }

    async fn update_tag(&self, name: &str, tag: &Tag) -> Result<Tag> {
        let rows = self
            .rest_patch(
                "tags",
                &eq_filter("name", name),
                &json!({ "name": tag.name, "color": tag.color, "icon": tag.icon }),
            )
            .await?;
        let row = rows.first().ok_or_else(|| BackendError::TagNotFound {
            backend: self.backend_name().to_string(),
            tag: name.to_string(),
        })?;
        serde_json::from_value::<SbTagRow>(row.clone())
            .map(Tag::from)
            .map_err(|e| self.parse_error(format!("tag row: {e}")))
    }

    async fn delete_tag(&self, name: &str) -> Result<()> {
        let rows = self.rest_delete("tags", &eq_filter("name", name)).await?;
        if rows.is_empty() {
            return Err(BackendError::TagNotFound {
                backend: self.backend_name().to_string(),
                tag: name.to_string(),
            });
        }
        Ok(())
    }

    async fn save_host(&self, domain_name: &str, host: &Host) -> Result<Host> {
        let domain_id = self.domain_id(domain_name).await?;

        // ISP lookup-or-create：已存在则更新现有行
        let existing = self
            .rest_get("hosts", &format!("select=id&{}", eq_filter("isp", &host.isp)))
            .await?;
        let host_id = if let Some(id) = existing.first().and_then(|r| r.get("id")) {
            let id = id.clone();
            self.rest_patch("hosts", &value_filter("id", &id), &Self::host_body(host))
                .await?;
            id
        } else {
            let created = self.rest_post("hosts", &Self::host_body(host)).await?;
            created
                .first()
                .and_then(|r| r.get("id"))
                .cloned()
                .ok_or_else(|| self.parse_error("hosts insert: 无返回行"))?
        };

        // 关联关系幂等：已存在则跳过
        let link = self
            .rest_get(
                "domain_hosts",
                &format!(
                    "select=host_id&{}&{}",
                    value_filter("domain_id", &domain_id),
                    value_filter("host_id", &host_id)
                ),
            )
            .await?;
        if link.is_empty() {
            self.rest_post(
                "domain_hosts",
                &json!({ "domain_id": domain_id, "host_id": host_id }),
            )
            .await?;
        }

        Ok(host.clone())
    }

    async fn delete_host(&self, isp: &str) -> Result<()> {
        // 幂等：不存在时静默成功
        self.rest_delete("hosts", &eq_filter("isp", isp)).await?;
        Ok(())
    }

    async fn update_domain_costing(&self, costing: &DomainCosting) -> Result<DomainCosting> {
        let domain_id = self.domain_id(&costing.domain_name).await?;
        let body = json!({
            "purchase_price": costing.purchase_price,
            "current_value": costing.current_value,
            "renewal_cost": costing.renewal_cost,
            "auto_renew": costing.auto_renew,
        });

        let existing = self
            .rest_get(
                "domain_costings",
                &format!("select=domain_id&{}", value_filter("domain_id", &domain_id)),
            )
            .await?;
        if existing.is_empty() {
            let mut insert = body
                .as_object()
                .cloned()
                .unwrap_or_default();
            insert.insert("domain_id".to_string(), domain_id);
            self.rest_post("domain_costings", &Value::Object(insert))
                .await?;
        } else {
            self.rest_patch(
                "domain_costings",
                &value_filter("domain_id", &domain_id),
                &body,
            )
            .await?;
        }
        Ok(costing.clone())
    }

    async fn record_uptime_check(&self, domain_name: &str, check: &UptimeCheck) -> Result<()> {
        let domain_id = self.domain_id(domain_name).await?;
        self.rest_post(
            "uptime",
            &json!({
                "domain_id": domain_id,
                "checked_at": check.checked_at,
                "is_up": check.is_up,
                "response_code": check.response_code,
                "response_time_ms": check.response_time_ms,
                "dns_lookup_time_ms": check.dns_lookup_time_ms,
                "ssl_handshake_time_ms": check.ssl_handshake_time_ms,
            }),
        )
        .await?;
        Ok(())
    }

    async fn set_notification_preference(
        &self,
        domain_name: &str,
        channel: &str,
        enabled: bool,
    ) -> Result<()> {
        let domain_id = self.domain_id(domain_name).await?;
        let filter = format!(
            "{}&{}",
            value_filter("domain_id", &domain_id),
            eq_filter("notification_type", channel)
        );
        let existing = self
            .rest_get(
                "notification_preferences",
                &format!("select=notification_type&{filter}"),
            )
            .await?;
        if existing.is_empty() {
            self.rest_post(
                "notification_preferences",
                &json!({
                    "domain_id": domain_id,
                    "notification_type": channel,
                    "is_enabled": enabled,
                }),
            )
            .await?;
        } else {
            self.rest_patch(
                "notification_preferences",
                &filter,
                &json!({ "is_enabled": enabled }),
            )
            .await?;
        }
        Ok(())
    }
}
