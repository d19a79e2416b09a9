//! 结果行映射（纯函数，无网络依赖）
//!
//! SQL 语句中列均以 camelCase 别名输出，行可直接反序列化为规范化类型。
//! 映射失败返回描述字符串，由调用方包装为 `ParseError`。

use serde_json::Value;

use crate::types::{
    Domain, DomainCosting, Host, HostDomainCount, NotificationPreference, StatusSummary,
    SubdomainGroup, UptimeCheck,
};

pub(crate) fn domain_from_row(row: &Value) -> Result<Domain, String> {
    serde_json::from_value(row.clone()).map_err(|e| format!("domain row: {e}"))
}

pub(crate) fn costing_from_row(row: &Value) -> Result<DomainCosting, String> {
    serde_json::from_value(row.clone()).map_err(|e| format!("costing row: {e}"))
}

pub(crate) fn host_from_row(row: &Value) -> Result<Host, String> {
    serde_json::from_value(row.clone()).map_err(|e| format!("host row: {e}"))
}

/// 主机聚合行：主机列平铺 + `domainCount`
pub(crate) fn host_count_from_row(row: &Value) -> Result<HostDomainCount, String> {
    let host = host_from_row(row)?;
    let domain_count = row
        .get("domainCount")
        .and_then(Value::as_u64)
        .ok_or_else(|| "host row: missing domainCount".to_string())?;
    Ok(HostDomainCount {
        host,
        domain_count: usize::try_from(domain_count).map_err(|e| format!("domainCount: {e}"))?,
    })
}

pub(crate) fn status_summary_from_row(row: &Value) -> Result<StatusSummary, String> {
    serde_json::from_value(row.clone()).map_err(|e| format!("status row: {e}"))
}

pub(crate) fn subdomain_group_from_row(row: &Value) -> Result<SubdomainGroup, String> {
    serde_json::from_value(row.clone()).map_err(|e| format!("subdomain row: {e}"))
}

pub(crate) fn uptime_from_row(row: &Value) -> Result<UptimeCheck, String> {
    serde_json::from_value(row.clone()).map_err(|e| format!("uptime row: {e}"))
}

pub(crate) fn notification_from_row(row: &Value) -> Result<NotificationPreference, String> {
    serde_json::from_value(row.clone()).map_err(|e| format!("notification row: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn domain_row_full() {
        let row = json!({
            "domainName": "example.com",
            "expiryDate": "2026-03-01T00:00:00Z",
            "registrationDate": "2020-03-01T00:00:00Z",
            "updatedDate": null,
            "notes": "primary",
            "registrar": { "name": "Gandi", "id": "81", "url": "https://gandi.net" },
            "tags": ["production", "blog"],
            "links": [{ "name": "panel", "url": "https://panel.example.com" }],
            "subdomains": [{ "name": "www", "sdInfo": null }],
            "ipAddresses": [{ "ipAddress": "1.2.3.4", "isIpv6": false }],
            "ssl": { "issuer": "Let's Encrypt", "validTo": "2025-12-01T00:00:00Z" },
            "whois": { "organization": "Example Org", "country": "DE" },
            "host": { "isp": "Hetzner", "country": "DE" },
            "statuses": ["clientTransferProhibited"],
            "notifications": [{ "notificationType": "expiry", "isEnabled": true }]
        });

        let d = domain_from_row(&row).unwrap();
        assert_eq!(d.domain_name, "example.com");
        assert_eq!(d.registrar.as_ref().unwrap().name, "Gandi");
        assert_eq!(d.tags, vec!["production", "blog"]);
        assert_eq!(d.ip_addresses[0].ip_address, "1.2.3.4");
        assert_eq!(d.ssl.as_ref().unwrap().issuer, "Let's Encrypt");
        assert_eq!(d.host.as_ref().unwrap().isp, "Hetzner");
        assert!(d.notifications[0].is_enabled);
    }

    #[test]
    fn domain_row_minimal() {
        let row = json!({ "domainName": "bare.io" });
        let d = domain_from_row(&row).unwrap();
        assert_eq!(d.domain_name, "bare.io");
        assert!(d.expiry_date.is_none());
        assert!(d.tags.is_empty());
    }

    #[test]
    fn domain_row_missing_name_fails() {
        let row = json!({ "notes": "oops" });
        assert!(domain_from_row(&row).is_err());
    }

    #[test]
    fn costing_row() {
        let row = json!({
            "domainName": "example.com",
            "purchasePrice": 12.5,
            "currentValue": 400.0,
            "renewalCost": 14.0,
            "autoRenew": true
        });
        let c = costing_from_row(&row).unwrap();
        assert_eq!(c.domain_name, "example.com");
        assert_eq!(c.current_value, Some(400.0));
        assert!(c.auto_renew);
    }

    #[test]
    fn costing_row_null_prices() {
        let row = json!({ "domainName": "example.com", "autoRenew": false });
        let c = costing_from_row(&row).unwrap();
        assert!(c.purchase_price.is_none());
        assert!(!c.auto_renew);
    }

    #[test]
    fn host_count_row() {
        let row = json!({
            "isp": "Hetzner",
            "org": "Hetzner Online GmbH",
            "country": "DE",
            "domainCount": 3
        });
        let hc = host_count_from_row(&row).unwrap();
        assert_eq!(hc.host.isp, "Hetzner");
        assert_eq!(hc.domain_count, 3);
    }

    #[test]
    fn host_count_row_missing_count_fails() {
        let row = json!({ "isp": "Hetzner" });
        assert!(host_count_from_row(&row).is_err());
    }

    #[test]
    fn status_summary_row() {
        let row = json!({
            "statusCode": "clientTransferProhibited",
            "domainCount": 2,
            "domains": ["a.com", "b.com"]
        });
        let s = status_summary_from_row(&row).unwrap();
        assert_eq!(s.status_code, "clientTransferProhibited");
        assert_eq!(s.domains.len(), 2);
    }

    #[test]
    fn uptime_row() {
        let row = json!({
            "checkedAt": "2025-06-01T12:00:00Z",
            "isUp": true,
            "responseCode": 200,
            "responseTimeMs": 132.4
        });
        let u = uptime_from_row(&row).unwrap();
        assert!(u.is_up);
        assert_eq!(u.response_code, Some(200));
        assert_eq!(u.dns_lookup_time_ms, None);
    }

    #[test]
    fn subdomain_group_row() {
        let row = json!({
            "domain": "example.com",
            "subdomains": [{ "name": "www" }, { "name": "mail", "sdInfo": "mx" }]
        });
        let g = subdomain_group_from_row(&row).unwrap();
        assert_eq!(g.domain, "example.com");
        assert_eq!(g.subdomains[1].sd_info.as_deref(), Some("mx"));
    }

    #[test]
    fn notification_row() {
        let row = json!({ "notificationType": "expiry", "isEnabled": false });
        let n = notification_from_row(&row).unwrap();
        assert_eq!(n.notification_type, "expiry");
        assert!(!n.is_enabled);
    }
}
