use async_trait::async_trait;

use crate::error::{BackendError, Result};
use crate::types::{
    Domain, DomainCosting, DomainUpdate, Host, HostDomainCount, NotificationPreference,
    SaveDomainRequest, StatusSummary, SubdomainGroup, Tag, UptimeCheck,
};

/// 原始后端错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawBackendError {
    /// 错误码（Postgres sqlstate / PostgREST code，格式各异）
    pub code: Option<String>,
    /// 原始错误消息
    pub message: String,
}

impl RawBackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// 错误上下文信息（内部使用）
/// 用于在映射错误时提供额外信息
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// 关系名（用于 `RelationNotFound` 等错误）
    pub relation: Option<String>,
}

/// 后端错误映射 Trait（内部使用）
/// 各后端实现此 trait 以将原始错误映射到统一错误类型
pub(crate) trait BackendErrorMapper {
    /// 返回后端标识符
    fn backend_name(&self) -> &'static str;

    /// 将原始后端错误映射到统一错误类型
    fn map_error(&self, raw: RawBackendError, context: ErrorContext) -> BackendError;

    /// 快捷方法：解析错误
    fn parse_error(&self, detail: impl ToString) -> BackendError {
        BackendError::ParseError {
            backend: self.backend_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// 快捷方法：序列化错误
    fn serialization_error(&self, detail: impl ToString) -> BackendError {
        BackendError::SerializationError {
            backend: self.backend_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// 快捷方法：网络错误
    fn network_error(&self, detail: impl ToString) -> BackendError {
        BackendError::NetworkError {
            backend: self.backend_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// 快捷方法：未知错误（fallback）
    fn unknown_error(&self, raw: RawBackendError) -> BackendError {
        BackendError::Unknown {
            backend: self.backend_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// 统一查询服务 Trait
///
/// 两个后端实现（`PgExecutorBackend` / `SupabaseBackend`）暴露完全相同的
/// 操作集合，参数与返回结构一致。消费方经由 `Arc<dyn QueryService>` 调用，
/// 不感知其下是哪种后端、是否被写入门禁包装。
///
/// 读操作永远放行；写操作集合由 core 层的写入门禁在构造时固定。
#[async_trait]
pub trait QueryService: Send + Sync {
    /// 后端标识符
    fn id(&self) -> &'static str;

    /// 验证连接是否可用
    async fn validate_connection(&self) -> Result<bool>;

    // ===== 读操作 =====

    /// 列出全部域名记录（含关联集合）
    async fn list_domains(&self) -> Result<Vec<Domain>>;

    /// 按名称获取单个域名记录
    async fn get_domain(&self, domain_name: &str) -> Result<Domain>;

    /// 列出全部标签
    async fn list_tags(&self) -> Result<Vec<Tag>>;

    /// 按标签查询域名
    async fn domains_by_tag(&self, tag: &str) -> Result<Vec<Domain>>;

    /// 列出全部主机
    async fn list_hosts(&self) -> Result<Vec<Host>>;

    /// 按 ISP 分组统计主机关联域名数
    ///
    /// Postgres 后端在 SQL 中聚合；Supabase 后端在内存中分组。
    async fn hosts_with_domain_counts(&self) -> Result<Vec<HostDomainCount>>;

    /// 读取全部域名估值
    async fn get_domain_costings(&self) -> Result<Vec<DomainCosting>>;

    /// 按 EPP 状态码聚合域名
    async fn status_summary(&self) -> Result<Vec<StatusSummary>>;

    /// 列出子域名（按父域名分组）
    async fn list_subdomains(&self) -> Result<Vec<SubdomainGroup>>;

    /// 读取某域名最近的健康检查历史（按时间倒序）
    async fn uptime_history(&self, domain_name: &str, limit: u32) -> Result<Vec<UptimeCheck>>;

    /// 读取某域名的通知偏好
    async fn notification_preferences(
        &self,
        domain_name: &str,
    ) -> Result<Vec<NotificationPreference>>;

    // ===== 写操作（写入门禁集合成员） =====

    /// 新建域名记录
    async fn save_domain(&self, req: &SaveDomainRequest) -> Result<Domain>;

    /// 部分更新域名记录
    async fn update_domain(&self, domain_name: &str, update: &DomainUpdate) -> Result<Domain>;

    /// 删除域名记录（级联删除关联集合）
    async fn delete_domain(&self, domain_name: &str) -> Result<()>;

    /// 全量替换某域名的标签
    async fn save_tags(&self, domain_name: &str, tags: &[String]) -> Result<()>;

    /// 新建标签
    async fn create_tag(&self, tag: &Tag) -> Result<Tag>;

    /// 更新标签（按旧名定位）
    async fn update_tag(&self, name: &str, tag: &Tag) -> Result<Tag>;

    /// 删除标签
    async fn delete_tag(&self, name: &str) -> Result<()>;

    /// 保存主机并关联到域名
    ///
    /// 按 ISP 名称 lookup-or-create：ISP 已存在时更新现有行，不产生重复。
    async fn save_host(&self, domain_name: &str, host: &Host) -> Result<Host>;

    /// 按 ISP 名称删除主机
    async fn delete_host(&self, isp: &str) -> Result<()>;

    /// 更新域名估值
    async fn update_domain_costing(&self, costing: &DomainCosting) -> Result<DomainCosting>;

    /// 追加一条健康检查结果（append-only）
    async fn record_uptime_check(&self, domain_name: &str, check: &UptimeCheck) -> Result<()>;

    /// 设置某域名某渠道的通知开关
    async fn set_notification_preference(
        &self,
        domain_name: &str,
        channel: &str,
        enabled: bool,
    ) -> Result<()>;
}
