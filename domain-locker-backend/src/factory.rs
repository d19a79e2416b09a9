//! 后端工厂
//!
//! 根据凭据结构体的类型创建对应的查询服务实例。
//! 未启用对应 feature 时返回 `NotConfigured`。

use std::sync::Arc;

use crate::error::Result;
use crate::traits::QueryService;
use crate::types::BackendCredentials;

#[cfg(not(all(feature = "postgres", feature = "supabase")))]
use crate::error::BackendError;

/// 根据凭据创建查询服务
///
/// # Errors
///
/// - 凭据格式无效（如 Supabase URL 非法）返回 `InvalidCredentials`
/// - 对应后端未编译进来时返回 `NotConfigured`
pub fn create_backend(credentials: &BackendCredentials) -> Result<Arc<dyn QueryService>> {
    match credentials {
        #[cfg(feature = "postgres")]
        BackendCredentials::Postgres {
            endpoint,
            host,
            port,
            user,
            password,
            database,
        } => Ok(Arc::new(crate::backends::PgExecutorBackend::new(
            endpoint.clone(),
            host.clone(),
            *port,
            user.clone(),
            password.clone(),
            database.clone(),
        ))),

        #[cfg(feature = "supabase")]
        BackendCredentials::Supabase { url, anon_key } => Ok(Arc::new(
            crate::backends::SupabaseBackend::new(url.clone(), anon_key.clone())?,
        )),

        #[cfg(not(all(feature = "postgres", feature = "supabase")))]
        #[allow(unreachable_patterns)]
        other => Err(BackendError::NotConfigured {
            detail: format!("后端未启用: {}", other.backend_kind()),
        }),
    }
}
