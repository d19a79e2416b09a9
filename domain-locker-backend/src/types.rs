//! 域名组合数据模型（两个后端共用的规范化类型）
//!
//! 两个后端对同一逻辑操作必须返回结构完全一致的类型，
//! 后端差异在各自的行映射层被抹平。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 后端连接凭证
///
/// 两个变体互斥：本地 Postgres（经 SQL 执行器端点）或 Supabase 托管实例。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "backend", rename_all = "camelCase")]
pub enum BackendCredentials {
    /// 自托管 Postgres，经远程 SQL 执行器端点访问
    #[serde(rename_all = "camelCase")]
    Postgres {
        /// SQL 执行器 HTTP 端点（POST）
        endpoint: String,
        host: String,
        port: u16,
        user: String,
        password: String,
        database: String,
    },
    /// Supabase 托管实例
    #[serde(rename_all = "camelCase")]
    Supabase { url: String, anon_key: String },
}

impl BackendCredentials {
    /// 后端种类标识（与 `QueryService::id` 对应）
    pub fn backend_kind(&self) -> &'static str {
        match self {
            Self::Postgres { .. } => "postgres",
            Self::Supabase { .. } => "supabase",
        }
    }
}

/// 注册商信息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Registrar {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// SSL 证书信息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SslInfo {
    pub issuer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_size: Option<u32>,
}

/// WHOIS 信息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WhoisInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

/// 主机（ISP/机房）信息
///
/// 与域名多对多关联，按 `isp` 名称去重（lookup-or-create）。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    pub isp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

impl Host {
    /// 以 ISP 名称创建最小主机记录
    #[must_use]
    pub fn with_isp(isp: impl Into<String>) -> Self {
        Self {
            isp: isp.into(),
            org: None,
            as_number: None,
            city: None,
            region: None,
            country: None,
            lat: None,
            lon: None,
        }
    }
}

/// 主机及其关联域名数（按 ISP 分组聚合结果）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HostDomainCount {
    pub host: Host,
    pub domain_count: usize,
}

/// 标签
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub name: String,
    #[serde(default = "default_tag_color")]
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// 默认标签颜色
fn default_tag_color() -> String {
    "grey".to_string()
}

impl Tag {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: default_tag_color(),
            icon: None,
        }
    }
}

/// 外部链接（域名附属资料）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub name: String,
    pub url: String,
}

/// 子域名
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subdomain {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sd_info: Option<String>,
}

/// 按父域名分组的子域名列表
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubdomainGroup {
    pub domain: String,
    pub subdomains: Vec<Subdomain>,
}

/// IP 地址记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IpAddress {
    pub ip_address: String,
    pub is_ipv6: bool,
}

/// 域名估值/成本信息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DomainCosting {
    pub domain_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renewal_cost: Option<f64>,
    #[serde(default)]
    pub auto_renew: bool,
}

/// 某个 EPP 状态码下的域名聚合
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub status_code: String,
    pub domain_count: usize,
    pub domains: Vec<String>,
}

/// 单次健康检查结果（仅追加的时间序列行）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UptimeCheck {
    pub checked_at: DateTime<Utc>,
    pub is_up: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_lookup_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_handshake_time_ms: Option<f64>,
}

/// 单渠道通知偏好
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreference {
    pub notification_type: String,
    pub is_enabled: bool,
}

/// 域名记录（中心实体）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    /// 唯一域名（字符串主键）
    pub domain_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrar: Option<Registrar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subdomains: Vec<Subdomain>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip_addresses: Vec<IpAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl: Option<SslInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois: Option<WhoisInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<Host>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statuses: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notifications: Vec<NotificationPreference>,
}

impl Domain {
    /// 以域名创建最小记录
    #[must_use]
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            domain_name: name.into(),
            registrar: None,
            expiry_date: None,
            registration_date: None,
            updated_date: None,
            notes: None,
            tags: Vec::new(),
            links: Vec::new(),
            subdomains: Vec::new(),
            ip_addresses: Vec::new(),
            ssl: None,
            whois: None,
            host: None,
            statuses: Vec::new(),
            notifications: Vec::new(),
        }
    }

    /// 距到期剩余天数（无到期日返回 `None`，已过期为负数）
    #[must_use]
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expiry_date.map(|d| (d - now).num_days())
    }
}

/// 新建/全量保存域名请求
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaveDomainRequest {
    pub domain_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrar: Option<Registrar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// 域名部分更新请求
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DomainUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrar: Option<Registrar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    /// `Some(None)` 表示清空备注
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl DomainUpdate {
    /// 没有任何待更新字段
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrar.is_none() && self.expiry_date.is_none() && self.notes.is_none()
    }
}
