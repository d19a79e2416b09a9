//! Postgres 错误映射

use crate::error::BackendError;
use crate::traits::{BackendErrorMapper, ErrorContext, RawBackendError};

use super::PgExecutorBackend;

/// 从服务端报文中还原关系名
///
/// 42P01 的报文形如 `relation "domains" does not exist`。
fn relation_in_message(message: &str) -> Option<String> {
    let rest = message.split("relation \"").nth(1)?;
    let name = rest.split('"').next()?;
    (!name.is_empty()).then(|| name.to_string())
}

/// Postgres SQLSTATE 映射
/// 参考: <https://www.postgresql.org/docs/current/errcodes-appendix.html>
impl BackendErrorMapper for PgExecutorBackend {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    fn map_error(&self, raw: RawBackendError, context: ErrorContext) -> BackendError {
        match raw.code.as_deref() {
            // 认证失败
            // 28000: invalid_authorization_specification
            // 28P01: invalid_password
            Some("28000" | "28P01") => BackendError::InvalidCredentials {
                backend: self.backend_name().to_string(),
                raw_message: Some(raw.message),
            },

            // 关系不存在
            // 42P01: undefined_table
            Some("42P01") => BackendError::RelationNotFound {
                backend: self.backend_name().to_string(),
                relation: context
                    .relation
                    .or_else(|| relation_in_message(&raw.message))
                    .unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },

            // 权限不足（行级安全、撤销的 GRANT）
            // 42501: insufficient_privilege
            Some("42501") => BackendError::PermissionDenied {
                backend: self.backend_name().to_string(),
                raw_message: Some(raw.message),
            },

            // 语句执行失败
            // 22xxx: data exception（类型/范围错误）
            // 23xxx: integrity_constraint_violation
            // 42xxx: syntax_error_or_access_rule_violation（上面两种除外）
            Some(code)
                if code.starts_with("22") || code.starts_with("23") || code.starts_with("42") =>
            {
                BackendError::QueryFailed {
                    backend: self.backend_name().to_string(),
                    detail: raw.message,
                }
            }

            // 查询取消/超时
            // 57014: query_canceled
            Some("57014") => BackendError::Timeout {
                backend: self.backend_name().to_string(),
                detail: raw.message,
            },

            // 连接异常
            // 08xxx: connection_exception
            Some(code) if code.starts_with("08") => BackendError::NetworkError {
                backend: self.backend_name().to_string(),
                detail: raw.message,
            },

            // 其他错误 fallback
            _ => self.unknown_error(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> PgExecutorBackend {
        PgExecutorBackend::new(
            "http://localhost:3000/query".to_string(),
            "localhost".to_string(),
            5432,
            "dl".to_string(),
            "secret".to_string(),
            "domain_locker".to_string(),
        )
    }

    #[test]
    fn map_invalid_password() {
        let e = backend().map_error(
            RawBackendError::with_code("28P01", "password authentication failed"),
            ErrorContext::default(),
        );
        assert!(matches!(e, BackendError::InvalidCredentials { .. }));
    }

    #[test]
    fn map_undefined_table() {
        let e = backend().map_error(
            RawBackendError::with_code("42P01", "relation \"domains\" does not exist"),
            ErrorContext {
                relation: Some("domains".to_string()),
            },
        );
        match e {
            BackendError::RelationNotFound { relation, .. } => assert_eq!(relation, "domains"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn map_undefined_table_relation_from_message() {
        let e = backend().map_error(
            RawBackendError::with_code("42P01", "relation \"uptime\" does not exist"),
            ErrorContext::default(),
        );
        match e {
            BackendError::RelationNotFound { relation, .. } => assert_eq!(relation, "uptime"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn map_undefined_table_without_relation_hint() {
        let e = backend().map_error(
            RawBackendError::with_code("42P01", "something unrecognizable"),
            ErrorContext::default(),
        );
        match e {
            BackendError::RelationNotFound { relation, .. } => assert_eq!(relation, "<unknown>"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn map_insufficient_privilege() {
        let e = backend().map_error(
            RawBackendError::with_code("42501", "permission denied for table domains"),
            ErrorContext::default(),
        );
        assert!(matches!(e, BackendError::PermissionDenied { .. }));
    }

    #[test]
    fn map_integrity_violation_as_query_failed() {
        let e = backend().map_error(
            RawBackendError::with_code("23505", "duplicate key value"),
            ErrorContext::default(),
        );
        assert!(matches!(e, BackendError::QueryFailed { .. }));
    }

    #[test]
    fn map_unknown_code_falls_back() {
        let e = backend().map_error(
            RawBackendError::with_code("XX000", "internal error"),
            ErrorContext::default(),
        );
        assert!(matches!(e, BackendError::Unknown { .. }));
    }

    #[test]
    fn map_no_code_falls_back() {
        let e = backend().map_error(
            RawBackendError::new("executor exploded"),
            ErrorContext::default(),
        );
        assert!(matches!(e, BackendError::Unknown { .. }));
    }
}
