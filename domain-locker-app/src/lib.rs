//! Platform-agnostic application bootstrap for Domain Locker.
//!
//! Provides `AppState` (service container), `AppStateBuilder` (adapter
//! injection), and the backend selector: credentials are resolved once at
//! startup into a [`BackendSession`], and every service call after that goes
//! through the session's write-gated backend. A deployment that fails to
//! resolve a backend still boots, with a stub backend and an error route.

pub mod adapters;
mod stub;

use std::sync::Arc;

use domain_locker_backend::{BackendCredentials, QueryService, create_backend};
use domain_locker_core::error::{CoreError, CoreResult};
use domain_locker_core::services::{DomainService, HostService, MonitorService, ServiceContext};
use domain_locker_core::traits::{CredentialStore, FeatureFlagStore};

use stub::StubBackend;

/// 启动时后端选择的结果（只解析一次，运行期不再切换）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendSession {
    /// 自托管 Postgres（经 SQL 执行器）
    Postgres,
    /// Supabase 托管实例
    Supabase,
    /// 无可用后端：携带给错误页的消息
    Error { message: String },
}

impl BackendSession {
    /// 会话是否可用
    #[must_use]
    pub fn is_ready(&self) -> bool {
        !matches!(self, Self::Error { .. })
    }

    /// 错误态的重定向路径（消息经 URL 编码）
    #[must_use]
    pub fn error_redirect_path(&self) -> Option<String> {
        match self {
            Self::Error { message } => {
                Some(format!("/error?message={}", urlencoding::encode(message)))
            }
            _ => None,
        }
    }
}

/// Platform-agnostic application state.
///
/// Holds the resolved backend session and all services. Every frontend
/// constructs this once at startup via [`AppStateBuilder`].
pub struct AppState {
    /// Service context (write-gated backend + flag store)
    pub ctx: Arc<ServiceContext>,
    /// Resolved backend session
    pub session: BackendSession,
    /// Domain portfolio service
    pub domain_service: DomainService,
    /// Host management service
    pub host_service: HostService,
    /// Uptime monitoring service
    pub monitor_service: MonitorService,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// 便捷访问：门禁后的查询服务
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn QueryService> {
        &self.ctx.backend
    }
}

/// Builder for constructing `AppState` with platform-specific adapters.
///
/// # Required adapters
/// - `credential_store` — where backend credentials come from
/// - `flag_store` — feature flag source (write permissions etc.)
pub struct AppStateBuilder {
    credential_store: Option<Arc<dyn CredentialStore>>,
    flag_store: Option<Arc<dyn FeatureFlagStore>>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            credential_store: None,
            flag_store: None,
        }
    }

    #[must_use]
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credential_store = Some(store);
        self
    }

    #[must_use]
    pub fn flag_store(mut self, store: Arc<dyn FeatureFlagStore>) -> Self {
        self.flag_store = Some(store);
        self
    }

    /// Build the `AppState`, resolving the backend session.
    ///
    /// Selector rules:
    /// - Postgres credentials configured → SQL-executor backend
    /// - Supabase credentials configured → Supabase backend; a construction
    ///   failure (e.g. malformed project URL) degrades to the error session
    /// - nothing configured → error session with a stub backend
    ///
    /// The error session never fails the boot: reads against the stub return
    /// `NotConfigured`, and `session.error_redirect_path()` carries the message.
    ///
    /// # Errors
    /// Returns `CoreError::ValidationError` if required adapters are missing;
    /// credential store failures surface as-is.
    pub async fn build(self) -> CoreResult<AppState> {
        let credential_store = self.credential_store.ok_or_else(|| {
            CoreError::ValidationError("credential_store is required".to_string())
        })?;
        let flag_store = self
            .flag_store
            .ok_or_else(|| CoreError::ValidationError("flag_store is required".to_string()))?;

        let (backend, session) = resolve_backend(credential_store.load().await?);

        let ctx = Arc::new(ServiceContext::gated(backend, flag_store));
        let domain_service = DomainService::new(Arc::clone(&ctx.backend));
        let host_service = HostService::new(Arc::clone(&ctx.backend));
        let monitor_service = MonitorService::new(Arc::clone(&ctx.backend));

        Ok(AppState {
            ctx,
            session,
            domain_service,
            host_service,
            monitor_service,
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 后端选择器：凭据 → (后端实例, 会话状态)
fn resolve_backend(
    credentials: Option<BackendCredentials>,
) -> (Arc<dyn QueryService>, BackendSession) {
    let Some(credentials) = credentials else {
        log::warn!("[bootstrap] 未配置任何后端，进入错误会话");
        return error_session("No database backend configured");
    };

    let kind = credentials.backend_kind();
    match create_backend(&credentials) {
        Ok(backend) => {
            log::info!("[bootstrap] 后端会话就绪: {kind}");
            let session = match credentials {
                BackendCredentials::Postgres { .. } => BackendSession::Postgres,
                BackendCredentials::Supabase { .. } => BackendSession::Supabase,
            };
            (backend, session)
        }
        Err(e) => {
            log::error!("[bootstrap] 后端构造失败 ({kind}): {e}");
            error_session(&format!("Failed to initialise {kind} backend: {e}"))
        }
    }
}

fn error_session(message: &str) -> (Arc<dyn QueryService>, BackendSession) {
    (
        Arc::new(StubBackend),
        BackendSession::Error {
            message: message.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::StaticFlagStore;
    use domain_locker_backend::BackendError;
    use domain_locker_core::error::CoreResult;
    use tokio::sync::RwLock;

    struct FixedCredentialStore(RwLock<Option<BackendCredentials>>);

    #[async_trait::async_trait]
    impl CredentialStore for FixedCredentialStore {
        async fn load(&self) -> CoreResult<Option<BackendCredentials>> {
            Ok(self.0.read().await.clone())
        }

        async fn save(&self, credentials: &BackendCredentials) -> CoreResult<()> {
            *self.0.write().await = Some(credentials.clone());
            Ok(())
        }
    }

    fn builder_with(credentials: Option<BackendCredentials>) -> AppStateBuilder {
        AppStateBuilder::new()
            .credential_store(Arc::new(FixedCredentialStore(RwLock::new(credentials))))
            .flag_store(Arc::new(StaticFlagStore::default()))
    }

    #[tokio::test]
    async fn postgres_credentials_resolve_postgres_session() {
        let state = builder_with(Some(BackendCredentials::Postgres {
            endpoint: "http://localhost:3000/query".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            user: "dl".to_string(),
            password: "pw".to_string(),
            database: "domains".to_string(),
        }))
        .build()
        .await
        .unwrap();

        assert_eq!(state.session, BackendSession::Postgres);
        assert!(state.session.is_ready());
        assert_eq!(state.backend().id(), "postgres");
    }

    #[tokio::test]
    async fn supabase_credentials_resolve_supabase_session() {
        let state = builder_with(Some(BackendCredentials::Supabase {
            url: "https://abc.supabase.co".to_string(),
            anon_key: "anon".to_string(),
        }))
        .build()
        .await
        .unwrap();

        assert_eq!(state.session, BackendSession::Supabase);
        assert_eq!(state.backend().id(), "supabase");
    }

    #[tokio::test]
    async fn malformed_supabase_url_degrades_to_error_session() {
        let state = builder_with(Some(BackendCredentials::Supabase {
            url: "::garbage::".to_string(),
            anon_key: "anon".to_string(),
        }))
        .build()
        .await
        .unwrap();

        assert!(!state.session.is_ready());
        let path = state.session.error_redirect_path().unwrap();
        assert!(path.starts_with("/error?message="));
        // 消息经 URL 编码，不含原始空格
        assert!(!path.contains(' '));

        // 错误会话下的查询返回 NotConfigured
        let err = state.backend().list_domains().await.unwrap_err();
        assert!(matches!(err, BackendError::NotConfigured { .. }));
    }

    #[tokio::test]
    async fn missing_credentials_degrade_to_error_session() {
        let state = builder_with(None).build().await.unwrap();
        assert!(matches!(state.session, BackendSession::Error { .. }));
        assert_eq!(state.backend().id(), "stub");
    }

    #[tokio::test]
    async fn builder_requires_adapters() {
        let err = AppStateBuilder::new().build().await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }
}
