//! Postgres QueryService trait 实现
//!
//! 域名查询统一经 `DOMAIN_SELECT` 输出 camelCase 别名列，
//! 关联集合在 SQL 内用 `json_agg` 聚合，行映射见 `rows`。

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::{BackendError, Result};
use crate::traits::{BackendErrorMapper, QueryService};
use crate::types::{
    Domain, DomainCosting, DomainUpdate, Host, HostDomainCount, NotificationPreference,
    SaveDomainRequest, StatusSummary, SubdomainGroup, Tag, UptimeCheck,
};

use super::{PgExecutorBackend, rows};

/// 域名主查询（关联集合在子查询内聚合为 JSON）
const DOMAIN_SELECT: &str = r#"
SELECT d.domain_name AS "domainName",
       d.expiry_date AS "expiryDate",
       d.registration_date AS "registrationDate",
       d.updated_date AS "updatedDate",
       d.notes,
       (SELECT json_build_object('name', r.name, 'id', r.id::text, 'url', r.url)
          FROM registrars r WHERE r.id = d.registrar_id) AS registrar,
       (SELECT COALESCE(json_agg(t.name ORDER BY t.name), '[]'::json)
          FROM domain_tags dt JOIN tags t ON t.id = dt.tag_id
         WHERE dt.domain_id = d.id) AS tags,
       (SELECT COALESCE(json_agg(json_build_object('name', l.link_name, 'url', l.link_url)), '[]'::json)
          FROM domain_links l WHERE l.domain_id = d.id) AS links,
       (SELECT COALESCE(json_agg(json_build_object('name', s.name, 'sdInfo', s.sd_info)), '[]'::json)
          FROM sub_domains s WHERE s.domain_id = d.id) AS subdomains,
       (SELECT COALESCE(json_agg(json_build_object('ipAddress', ip.ip_address, 'isIpv6', ip.is_ipv6)), '[]'::json)
          FROM ip_addresses ip WHERE ip.domain_id = d.id) AS "ipAddresses",
       (SELECT json_build_object('issuer', c.issuer, 'issuerCountry', c.issuer_country,
                                 'validFrom', c.valid_from, 'validTo', c.valid_to,
                                 'subject', c.subject, 'keySize', c.key_size)
          FROM ssl_certificates c WHERE c.domain_id = d.id LIMIT 1) AS ssl,
       (SELECT json_build_object('name', w.name, 'organization', w.organization,
                                 'country', w.country, 'state', w.state,
                                 'city', w.city, 'postalCode', w.postal_code)
          FROM whois_info w WHERE w.domain_id = d.id LIMIT 1) AS whois,
       (SELECT json_build_object('isp', h.isp, 'org', h.org, 'asNumber', h.as_number,
                                 'city', h.city, 'region', h.region, 'country', h.country,
                                 'lat', h.lat, 'lon', h.lon)
          FROM domain_hosts dh JOIN hosts h ON h.id = dh.host_id
         WHERE dh.domain_id = d.id LIMIT 1) AS host,
       (SELECT COALESCE(json_agg(ds.status_code), '[]'::json)
          FROM domain_statuses ds WHERE ds.domain_id = d.id) AS statuses,
       (SELECT COALESCE(json_agg(json_build_object('notificationType', n.notification_type, 'isEnabled', n.is_enabled)), '[]'::json)
          FROM notification_preferences n WHERE n.domain_id = d.id) AS notifications
  FROM domains d"#;

impl PgExecutorBackend {
    /// 确认域名存在，返回 `DomainNotFound` 否则
    async fn ensure_domain_exists(&self, domain_name: &str) -> Result<()> {
        let rows = self
            .execute(
                "SELECT 1 FROM domains WHERE domain_name = $1",
                vec![json!(domain_name)],
            )
            .await?;
        if rows.is_empty() {
            return Err(BackendError::DomainNotFound {
                backend: self.backend_name().to_string(),
                domain: domain_name.to_string(),
            });
        }
        Ok(())
    }

    fn map_rows<T>(
        &self,
        rows: &[Value],
        mapper: impl Fn(&Value) -> std::result::Result<T, String>,
    ) -> Result<Vec<T>> {
        rows.iter()
            .map(|row| mapper(row).map_err(|e| self.parse_error(e)))
            .collect()
    }
}

#[async_trait]
impl QueryService for PgExecutorBackend {
    fn id(&self) -> &'static str {
        "postgres"
    }

    async fn validate_connection(&self) -> Result<bool> {
        match self.execute("SELECT 1 AS ok", vec![]).await {
            Ok(_) => Ok(true),
            Err(BackendError::InvalidCredentials { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn list_domains(&self) -> Result<Vec<Domain>> {
        let query = format!("{DOMAIN_SELECT}\n ORDER BY d.domain_name");
        let rows = self.execute(&query, vec![]).await?;
        self.map_rows(&rows, rows::domain_from_row)
    }

    async fn get_domain(&self, domain_name: &str) -> Result<Domain> {
        let query = format!("{DOMAIN_SELECT}\n WHERE d.domain_name = $1");
        let rows = self.execute(&query, vec![json!(domain_name)]).await?;
        let row = rows.first().ok_or_else(|| BackendError::DomainNotFound {
            backend: self.backend_name().to_string(),
            domain: domain_name.to_string(),
        })?;
        rows::domain_from_row(row).map_err(|e| self.parse_error(e))
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        let rows = self
            .execute(
                "SELECT name, COALESCE(color, 'grey') AS color, icon FROM tags ORDER BY name",
                vec![],
            )
            .await?;
        self.map_rows(&rows, |row| {
            serde_json::from_value(row.clone()).map_err(|e| format!("tag row: {e}"))
        })
    }

    async fn domains_by_tag(&self, tag: &str) -> Result<Vec<Domain>> {
        let query = format!(
            "{DOMAIN_SELECT}\n WHERE d.id IN (SELECT dt.domain_id FROM domain_tags dt \
             JOIN tags t ON t.id = dt.tag_id WHERE t.name = $1)\n ORDER BY d.domain_name"
        );
        let rows = self.execute(&query, vec![json!(tag)]).await?;
        self.map_rows(&rows, rows::domain_from_row)
    }

    async fn list_hosts(&self) -> Result<Vec<Host>> {
        let rows = self
            .execute(
                "SELECT isp, org, as_number AS \"asNumber\", city, region, country, lat, lon \
                 FROM hosts ORDER BY isp",
                vec![],
            )
            .await?;
        self.map_rows(&rows, rows::host_from_row)
    }

    async fn hosts_with_domain_counts(&self) -> Result<Vec<HostDomainCount>> {
        let rows = self
            .execute(
                "SELECT h.isp, h.org, h.as_number AS \"asNumber\", h.city, h.region, h.country, \
                 h.lat, h.lon, COUNT(dh.domain_id)::int AS \"domainCount\" \
                 FROM hosts h LEFT JOIN domain_hosts dh ON dh.host_id = h.id \
                 GROUP BY h.id ORDER BY \"domainCount\" DESC, h.isp",
                vec![],
            )
            .await?;
        self.map_rows(&rows, rows::host_count_from_row)
    }

    async fn get_domain_costings(&self) -> Result<Vec<DomainCosting>> {
        let rows = self
            .execute(
                "SELECT d.domain_name AS \"domainName\", c.purchase_price AS \"purchasePrice\", \
                 c.current_value AS \"currentValue\", c.renewal_cost AS \"renewalCost\", \
                 COALESCE(c.auto_renew, false) AS \"autoRenew\" \
                 FROM domain_costings c JOIN domains d ON d.id = c.domain_id \
                 ORDER BY d.domain_name",
                vec![],
            )
            .await?;
        self.map_rows(&rows, rows::costing_from_row)
    }

    async fn status_summary(&self) -> Result<Vec<StatusSummary>> {
        let rows = self
            .execute(
                "SELECT ds.status_code AS \"statusCode\", COUNT(*)::int AS \"domainCount\", \
                 json_agg(d.domain_name ORDER BY d.domain_name) AS domains \
                 FROM domain_statuses ds JOIN domains d ON d.id = ds.domain_id \
                 GROUP BY ds.status_code ORDER BY \"domainCount\" DESC",
                vec![],
            )
            .await?;
        self.map_rows(&rows, rows::status_summary_from_row)
    }

    async fn list_subdomains(&self) -> Result<Vec<SubdomainGroup>> {
        let rows = self
            .execute(
                "SELECT d.domain_name AS domain, \
                 json_agg(json_build_object('name', s.name, 'sdInfo', s.sd_info) ORDER BY s.name) AS subdomains \
                 FROM sub_domains s JOIN domains d ON d.id = s.domain_id \
                 GROUP BY d.domain_name ORDER BY d.domain_name",
                vec![],
            )
            .await?;
        self.map_rows(&rows, rows::subdomain_group_from_row)
    }

    async fn uptime_history(&self, domain_name: &str, limit: u32) -> Result<Vec<UptimeCheck>> {
        self.ensure_domain_exists(domain_name).await?;
        let rows = self
            .execute(
                "SELECT u.checked_at AS \"checkedAt\", u.is_up AS \"isUp\", \
                 u.response_code AS \"responseCode\", u.response_time_ms AS \"responseTimeMs\", \
                 u.dns_lookup_time_ms AS \"dnsLookupTimeMs\", \
                 u.ssl_handshake_time_ms AS \"sslHandshakeTimeMs\" \
                 FROM uptime u JOIN domains d ON d.id = u.domain_id \
                 WHERE d.domain_name = $1 ORDER BY u.checked_at DESC LIMIT $2",
                vec![json!(domain_name), json!(limit)],
            )
            .await?;
        self.map_rows(&rows, rows::uptime_from_row)
    }

    async fn notification_preferences(
        &self,
        domain_name: &str,
    ) -> Result<Vec<NotificationPreference>> {
        self.ensure_domain_exists(domain_name).await?;
        let rows = self
            .execute(
                "SELECT n.notification_type AS \"notificationType\", n.is_enabled AS \"isEnabled\" \
                 FROM notification_preferences n JOIN domains d ON d.id = n.domain_id \
                 WHERE d.domain_name = $1 ORDER BY n.notification_type",
                vec![json!(domain_name)],
            )
            .await?;
        self.map_rows(&rows, rows::notification_from_row)
    }

    async fn save_domain(&self, req: &SaveDomainRequest) -> Result<Domain> {
        if let Some(registrar) = &req.registrar {
            self.execute(
                "INSERT INTO registrars (name, url) VALUES ($1, $2) \
                 ON CONFLICT (name) DO UPDATE SET url = COALESCE(EXCLUDED.url, registrars.url)",
                vec![json!(registrar.name), json!(registrar.url)],
            )
            .await?;
        }

        let registrar_name = req.registrar.as_ref().map(|r| r.name.clone());
        self.execute(
            "INSERT INTO domains (domain_name, expiry_date, notes, registrar_id) \
             VALUES ($1, $2, $3, (SELECT id FROM registrars WHERE name = $4)) \
             RETURNING domain_name",
            vec![
                json!(req.domain_name),
                json!(req.expiry_date),
                json!(req.notes),
                json!(registrar_name),
            ],
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

        // SET 子句按出现的字段静态拼装，值全部走参数位
        let mut sets: Vec<String> = Vec::new();
        let mut params: Vec<Value> = vec![json!(domain_name)];

        if let Some(registrar) = &update.registrar {
            self.execute(
                "INSERT INTO registrars (name, url) VALUES ($1, $2) \
                 ON CONFLICT (name) DO UPDATE SET url = COALESCE(EXCLUDED.url, registrars.url)",
                vec![json!(registrar.name), json!(registrar.url)],
            )
            .await?;
            params.push(json!(registrar.name));
            sets.push(format!(
                "registrar_id = (SELECT id FROM registrars WHERE name = ${})",
                params.len()
            ));
        }
        if let Some(expiry) = &update.expiry_date {
            params.push(json!(expiry));
            sets.push(format!("expiry_date = ${}", params.len()));
        }
        if let Some(notes) = &update.notes {
            params.push(json!(notes));
            sets.push(format!("notes = ${}", params.len()));
        }
        sets.push("updated_date = now()".to_string());

        let query = format!(
            "UPDATE domains SET {} WHERE domain_name = $1 RETURNING domain_name",
            sets.join(", ")
        );
        let rows = self.execute(&query, params).await?;
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
            .execute(
                "DELETE FROM domains WHERE domain_name = $1 RETURNING domain_name",
                vec![json!(domain_name)],
            )
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
        self.ensure_domain_exists(domain_name).await?;

        self.execute(
            "DELETE FROM domain_tags WHERE domain_id = \
             (SELECT id FROM domains WHERE domain_name = $1)",
            vec![json!(domain_name)],
        )
        .await?;

        for tag in tags {
            self.execute(
                "INSERT INTO tags (name) VALUES ($1) ON CONFLICT (name) DO NOTHING",
                vec![json!(tag)],
            )
            .await?;
            self.execute(
                "INSERT INTO domain_tags (domain_id, tag_id) \
                 SELECT d.id, t.id FROM domains d, tags t \
                 WHERE d.domain_name = $1 AND t.name = $2 \
                 ON CONFLICT DO NOTHING",
                vec![json!(domain_name), json!(tag)],
            )
            .await?;
        }
        Ok(())
    }

    async fn create_tag(&self, tag: &Tag) -> Result<Tag> {
        let rows = self
            .execute(
                "INSERT INTO tags (name, color, icon) VALUES ($1, $2, $3) \
                 RETURNING name, color, icon",
                vec![json!(tag.name), json!(tag.color), json!(tag.icon)],
            )
            .await?;
        let row = rows
            .first()
            .ok_or_else(|| self.parse_error("create_tag: 无返回行"))?;
        serde_json::from_value(row.clone()).map_err(|e| self.parse_error(e))
    }

    async fn update_tag(&self, name: &str, tag: &Tag) -> Result<Tag> {
        let rows = self
            .execute(
                "UPDATE tags SET name = $2, color = $3, icon = $4 WHERE name = $1 \
                 RETURNING name, color, icon",
                vec![
                    json!(name),
                    json!(tag.name),
                    json!(tag.color),
                    json!(tag.icon),
                ],
            )
            .await?;
        let row = rows.first().ok_or_else(|| BackendError::TagNotFound {
            backend: self.backend_name().to_string(),
            tag: name.to_string(),
        })?;
        serde_json::from_value(row.clone()).map_err(|e| self.parse_error(e))
    }

    async fn delete_tag(&self, name: &str) -> Result<()> {
        let rows = self
            .execute(
                "DELETE FROM tags WHERE name = $1 RETURNING name",
                vec![json!(name)],
            )
            .await?;
        if rows.is_empty() {
            return Err(BackendError::TagNotFound {
                backend: self.backend_name().to_string(),
                tag: name.to_string(),
            });
        }
        Ok(())
    }

    async fn save_host(&self, domain_name: &str, host: &Host) -> Result<Host> {
        self.ensure_domain_exists(domain_name).await?;

        // ISP 唯一：已存在则整行更新，不产生重复
        let rows = self
            .execute(
                "INSERT INTO hosts (isp, org, as_number, city, region, country, lat, lon) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                 ON CONFLICT (isp) DO UPDATE SET org = EXCLUDED.org, \
                 as_number = EXCLUDED.as_number, city = EXCLUDED.city, \
                 region = EXCLUDED.region, country = EXCLUDED.country, \
                 lat = EXCLUDED.lat, lon = EXCLUDED.lon \
                 RETURNING isp, org, as_number AS \"asNumber\", city, region, country, lat, lon",
                vec![
                    json!(host.isp),
                    json!(host.org),
                    json!(host.as_number),
                    json!(host.city),
                    json!(host.region),
                    json!(host.country),
                    json!(host.lat),
                    json!(host.lon),
                ],
            )
            .await?;

        self.execute(
            "INSERT INTO domain_hosts (domain_id, host_id) \
             SELECT d.id, h.id FROM domains d, hosts h \
             WHERE d.domain_name = $1 AND h.isp = $2 \
             ON CONFLICT DO NOTHING",
            vec![json!(domain_name), json!(host.isp)],
        )
        .await?;

        let row = rows
            .first()
            .ok_or_else(|| self.parse_error("save_host: 无返回行"))?;
        rows::host_from_row(row).map_err(|e| self.parse_error(e))
    }

    async fn delete_host(&self, isp: &str) -> Result<()> {
        // 幂等：不存在时静默成功
        self.execute("DELETE FROM hosts WHERE isp = $1", vec![json!(isp)])
            .await?;
        Ok(())
    }

    async fn update_domain_costing(&self, costing: &DomainCosting) -> Result<DomainCosting> {
        self.ensure_domain_exists(&costing.domain_name).await?;
        self.execute(
            "INSERT INTO domain_costings (domain_id, purchase_price, current_value, renewal_cost, auto_renew) \
             SELECT id, $2, $3, $4, $5 FROM domains WHERE domain_name = $1 \
             ON CONFLICT (domain_id) DO UPDATE SET purchase_price = EXCLUDED.purchase_price, \
             current_value = EXCLUDED.current_value, renewal_cost = EXCLUDED.renewal_cost, \
             auto_renew = EXCLUDED.auto_renew",
            vec![
                json!(costing.domain_name),
                json!(costing.purchase_price),
                json!(costing.current_value),
                json!(costing.renewal_cost),
                json!(costing.auto_renew),
            ],
        )
        .await?;
        Ok(costing.clone())
    }

    async fn record_uptime_check(&self, domain_name: &str, check: &UptimeCheck) -> Result<()> {
        let rows = self
            .execute(
                "INSERT INTO uptime (domain_id, checked_at, is_up, response_code, \
                 response_time_ms, dns_lookup_time_ms, ssl_handshake_time_ms) \
                 SELECT id, $2, $3, $4, $5, $6, $7 FROM domains WHERE domain_name = $1 \
                 RETURNING domain_id",
                vec![
                    json!(domain_name),
                    json!(check.checked_at),
                    json!(check.is_up),
                    json!(check.response_code),
                    json!(check.response_time_ms),
                    json!(check.dns_lookup_time_ms),
                    json!(check.ssl_handshake_time_ms),
                ],
            )
            .await?;
        if rows.is_empty() {
            return Err(BackendError::DomainNotFound {
                backend: self.backend_name().to_string(),
                domain: domain_name.to_string(),
            });
        }
        Ok(())
    }

    async fn set_notification_preference(
        &self,
        domain_name: &str,
        channel: &str,
        enabled: bool,
    ) -> Result<()> {
        let rows = self
            .execute(
                "INSERT INTO notification_preferences (domain_id, notification_type, is_enabled) \
                 SELECT id, $2, $3 FROM domains WHERE domain_name = $1 \
                 ON CONFLICT (domain_id, notification_type) \
                 DO UPDATE SET is_enabled = EXCLUDED.is_enabled \
                 RETURNING notification_type",
                vec![json!(domain_name), json!(channel), json!(enabled)],
            )
            .await?;
        if rows.is_empty() {
            return Err(BackendError::DomainNotFound {
                backend: self.backend_name().to_string(),
                domain: domain_name.to_string(),
            });
        }
        Ok(())
    }
}
