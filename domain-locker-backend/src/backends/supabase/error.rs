//! Supabase (PostgREST) 错误映射

use crate::error::BackendError;
use crate::traits::{BackendErrorMapper, ErrorContext, RawBackendError};

use super::SupabaseBackend;

/// PostgREST 错误码映射
/// 参考: <https://postgrest.org/en/stable/references/errors.html>
///
/// PostgREST 会透传 Postgres SQLSTATE（如 `42P01`），自身错误使用
/// `PGRST` 前缀码。
impl BackendErrorMapper for SupabaseBackend {
    fn backend_name(&self) -> &'static str {
        "supabase"
    }

    fn map_error(&self, raw: RawBackendError, context: ErrorContext) -> BackendError {
        match raw.code.as_deref() {
            // JWT 无效/过期
            // PGRST301: JWT expired / invalid
            // PGRST302: anonymous access disabled
            Some("PGRST301" | "PGRST302") => BackendError::InvalidCredentials {
                backend: self.backend_name().to_string(),
                raw_message: Some(raw.message),
            },

            // 关系不存在
            // 42P01: undefined_table（透传）
            // PGRST205: could not find the table in the schema cache
            Some("42P01" | "PGRST205") => BackendError::RelationNotFound {
                backend: self.backend_name().to_string(),
                relation: context.relation.unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },

            // 行级安全/权限
            // 42501: insufficient_privilege（透传）
            Some("42501") => BackendError::PermissionDenied {
                backend: self.backend_name().to_string(),
                raw_message: Some(raw.message),
            },

            // 约束/类型错误（透传的 SQLSTATE）
            Some(code)
                if code.starts_with("22") || code.starts_with("23") || code.starts_with("42") =>
            {
                BackendError::QueryFailed {
                    backend: self.backend_name().to_string(),
                    detail: raw.message,
                }
            }

            // 其他错误 fallback
            _ => self.unknown_error(raw),
        }
    }
}
