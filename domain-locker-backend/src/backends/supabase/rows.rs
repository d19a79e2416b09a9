//! PostgREST 嵌套行映射（纯函数，无网络依赖）
//!
//! PostgREST 返回 snake_case 列名与嵌套的关联资源，
//! 这里统一折叠为与 Postgres 后端完全相同的规范化类型。

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::types::{
    Domain, DomainCosting, Host, IpAddress, Link, NotificationPreference, Registrar, SslInfo,
    Subdomain, WhoisInfo,
};

#[derive(Debug, Deserialize)]
pub(crate) struct SbRegistrarRow {
    pub name: String,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SbTagRef {
    #[serde(default)]
    pub tags: Option<SbTagName>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SbTagName {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SbLinkRow {
    pub link_name: String,
    pub link_url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SbSubdomainRow {
    pub name: String,
    #[serde(default)]
    pub sd_info: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SbIpRow {
    pub ip_address: String,
    pub is_ipv6: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SbSslRow {
    pub issuer: String,
    #[serde(default)]
    pub issuer_country: Option<String>,
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub valid_to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub key_size: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct SbWhoisRow {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SbHostRef {
    #[serde(default)]
    pub hosts: Option<SbHostRow>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SbHostRow {
    pub isp: String,
    #[serde(default)]
    pub org: Option<String>,
    #[serde(default)]
    pub as_number: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl From<SbHostRow> for Host {
    fn from(row: SbHostRow) -> Self {
        Self {
            isp: row.isp,
            org: row.org,
            as_number: row.as_number,
            city: row.city,
            region: row.region,
            country: row.country,
            lat: row.lat,
            lon: row.lon,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SbStatusRow {
    pub status_code: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SbNotificationRow {
    pub notification_type: String,
    pub is_enabled: bool,
}

/// `domains` 关系的完整嵌套行
#[derive(Debug, Deserialize)]
pub(crate) struct SbDomainRow {
    pub domain_name: String,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub registration_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub registrars: Option<SbRegistrarRow>,
    #[serde(default)]
    pub domain_tags: Vec<SbTagRef>,
    #[serde(default)]
    pub domain_links: Vec<SbLinkRow>,
    #[serde(default)]
    pub sub_domains: Vec<SbSubdomainRow>,
    #[serde(default)]
    pub ip_addresses: Vec<SbIpRow>,
    #[serde(default)]
    pub ssl_certificates: Vec<SbSslRow>,
    #[serde(default)]
    pub whois_info: Vec<SbWhoisRow>,
    #[serde(default)]
    pub domain_hosts: Vec<SbHostRef>,
    #[serde(default)]
    pub domain_statuses: Vec<SbStatusRow>,
    #[serde(default)]
    pub notification_preferences: Vec<SbNotificationRow>,
}

impl SbDomainRow {
    /// 折叠为规范化 `Domain`
    pub(crate) fn into_domain(self) -> Domain {
        let mut tags: Vec<String> = self
            .domain_tags
            .into_iter()
            .filter_map(|t| t.tags.map(|n| n.name))
            .collect();
        tags.sort();

        Domain {
            domain_name: self.domain_name,
            registrar: self.registrars.map(|r| Registrar {
                name: r.name,
                id: r.id.map(|v| match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                }),
                url: r.url,
            }),
            expiry_date: self.expiry_date,
            registration_date: self.registration_date,
            updated_date: self.updated_date,
            notes: self.notes,
            tags,
            links: self
                .domain_links
                .into_iter()
                .map(|l| Link {
                    name: l.link_name,
                    url: l.link_url,
                })
                .collect(),
            subdomains: self
                .sub_domains
                .into_iter()
                .map(|s| Subdomain {
                    name: s.name,
                    sd_info: s.sd_info,
                })
                .collect(),
            ip_addresses: self
                .ip_addresses
                .into_iter()
                .map(|ip| IpAddress {
                    ip_address: ip.ip_address,
                    is_ipv6: ip.is_ipv6,
                })
                .collect(),
            ssl: self.ssl_certificates.into_iter().next().map(|c| SslInfo {
                issuer: c.issuer,
                issuer_country: c.issuer_country,
                valid_from: c.valid_from,
                valid_to: c.valid_to,
                subject: c.subject,
                key_size: c.key_size,
            }),
            whois: self.whois_info.into_iter().next().map(|w| WhoisInfo {
                name: w.name,
                organization: w.organization,
                country: w.country,
                state: w.state,
                city: w.city,
                postal_code: w.postal_code,
            }),
            host: self
                .domain_hosts
                .into_iter()
                .filter_map(|h| h.hosts)
                .next()
                .map(Host::from),
            statuses: self
                .domain_statuses
                .into_iter()
                .map(|s| s.status_code)
                .collect(),
            notifications: self
                .notification_preferences
                .into_iter()
                .map(|n| NotificationPreference {
                    notification_type: n.notification_type,
                    is_enabled: n.is_enabled,
                })
                .collect(),
        }
    }
}

pub(crate) fn domain_from_row(row: &Value) -> Result<Domain, String> {
    let parsed: SbDomainRow =
        serde_json::from_value(row.clone()).map_err(|e| format!("domain row: {e}"))?;
    Ok(parsed.into_domain())
}

/// `domain_costings` 行（域名经嵌套的 `domains` 资源取得）
#[derive(Debug, Deserialize)]
pub(crate) struct SbCostingRow {
    #[serde(default)]
    pub purchase_price: Option<f64>,
    #[serde(default)]
    pub current_value: Option<f64>,
    #[serde(default)]
    pub renewal_cost: Option<f64>,
    #[serde(default)]
    pub auto_renew: bool,
    pub domains: SbDomainName,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SbDomainName {
    pub domain_name: String,
}

pub(crate) fn costing_from_row(row: &Value) -> Result<DomainCosting, String> {
    let parsed: SbCostingRow =
        serde_json::from_value(row.clone()).map_err(|e| format!("costing row: {e}"))?;
    Ok(DomainCosting {
        domain_name: parsed.domains.domain_name,
        purchase_price: parsed.purchase_price,
        current_value: parsed.current_value,
        renewal_cost: parsed.renewal_cost,
        auto_renew: parsed.auto_renew,
    })
}

pub(crate) fn host_from_row(row: &Value) -> Result<Host, String> {
    let parsed: SbHostRow =
        serde_json::from_value(row.clone()).map_err(|e| format!("host row: {e}"))?;
    Ok(parsed.into())
}
