//! 健康监控与到期提醒服务
//!
//! 探测按域名逐个串行执行，避免对小型自托管实例造成突发压力。
//! 探测失败是数据而非错误：落库为 `is_up = false` 的检查记录。

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use domain_locker_backend::{Domain, QueryService, UptimeCheck};
use serde::Serialize;

use crate::error::CoreResult;

/// 到期提醒阈值（天），从远到近
pub const REMINDER_THRESHOLD_DAYS: [i64; 3] = [90, 30, 7];

/// 单次探测的超时
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// 到期提醒
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryReminder {
    pub domain_name: String,
    /// 距到期剩余天数
    pub days_remaining: i64,
    /// 命中的提醒阈值
    pub threshold: i64,
}

/// 健康监控服务
pub struct MonitorService {
    backend: Arc<dyn QueryService>,
    client: reqwest::Client,
}

impl MonitorService {
    /// 创建监控服务实例
    #[must_use]
    pub fn new(backend: Arc<dyn QueryService>) -> Self {
        Self {
            backend,
            client: reqwest::Client::builder()
                .timeout(PROBE_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    /// 对单个域名做一次 HTTPS 探测
    ///
    /// 网络失败不返回错误，落为 `is_up = false` 的记录。
    pub async fn probe(&self, domain_name: &str) -> UptimeCheck {
        let url = format!("https://{domain_name}/");
        let started = Instant::now();
        let checked_at = Utc::now();

        match self.client.get(&url).send().await {
            Ok(response) => {
                let elapsed = started.elapsed().as_secs_f64() * 1000.0;
                let status = response.status();
                UptimeCheck {
                    checked_at,
                    is_up: status.is_success() || status.is_redirection(),
                    response_code: Some(status.as_u16()),
                    response_time_ms: Some(elapsed),
                    dns_lookup_time_ms: None,
                    ssl_handshake_time_ms: None,
                }
            }
            Err(e) => {
                log::warn!("[monitor] 探测失败 {domain_name}: {e}");
                UptimeCheck {
                    checked_at,
                    is_up: false,
                    response_code: None,
                    response_time_ms: None,
                    dns_lookup_time_ms: None,
                    ssl_handshake_time_ms: None,
                }
            }
        }
    }

    /// 串行探测全部域名并落库
    ///
    /// 返回 `(域名, 是否在线)` 列表。单条落库失败记日志后继续，
    /// 不中断整轮检查。
    pub async fn run_checks(&self) -> CoreResult<Vec<(String, bool)>> {
        let domains = self.backend.list_domains().await?;
        let mut results = Vec::with_capacity(domains.len());

        for domain in &domains {
            let check = self.probe(&domain.domain_name).await;
            let is_up = check.is_up;
            if let Err(e) = self
                .backend
                .record_uptime_check(&domain.domain_name, &check)
                .await
            {
                if e.is_expected() {
                    log::warn!("[monitor] 记录检查失败 {}: {e}", domain.domain_name);
                } else {
                    log::error!("[monitor] 记录检查失败 {}: {e}", domain.domain_name);
                }
            }
            results.push((domain.domain_name.clone(), is_up));
        }

        log::info!(
            "[monitor] 本轮检查完成: {} 在线 / {} 总数",
            results.iter().filter(|(_, up)| *up).count(),
            results.len()
        );
        Ok(results)
    }

    /// 计算当前命中提醒阈值的域名
    pub async fn expiry_reminders(&self) -> CoreResult<Vec<ExpiryReminder>> {
        let domains = self.backend.list_domains().await?;
        Ok(reminders_for(&domains, Utc::now()))
    }
}

/// 纯函数：对一组域名计算到期提醒
///
/// 剩余天数落入某阈值窗口（`0 <= 剩余 <= 阈值`）时产生提醒，
/// 报告命中的最小阈值；已过期或无到期日的域名不提醒。
fn reminders_for(domains: &[Domain], now: DateTime<Utc>) -> Vec<ExpiryReminder> {
    let mut reminders: Vec<ExpiryReminder> = domains
        .iter()
        .filter_map(|domain| {
            let remaining = domain.days_until_expiry(now)?;
            if remaining < 0 {
                return None;
            }
            let threshold = REMINDER_THRESHOLD_DAYS
                .iter()
                .rev()
                .find(|&&t| remaining <= t)?;
            Some(ExpiryReminder {
                domain_name: domain.domain_name.clone(),
                days_remaining: remaining,
                threshold: *threshold,
            })
        })
        .collect();
    reminders.sort_by_key(|r| r.days_remaining);
    reminders
}
