use serde::{Deserialize, Serialize};

/// Unified error type for all backend query operations.
///
/// Each variant includes a `backend` field identifying which backend produced the error,
/// plus variant-specific context. All variants are serializable for structured error reporting.
///
/// # Synthesized Errors
///
/// [`WritesDisabled`](Self::WritesDisabled) is never produced by a backend: it is
/// synthesized by the write gate when a mutating operation is rejected on a
/// write-restricted deployment. Consumers can match on it to show a specific
/// warning instead of a generic failure toast.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum BackendError {
    /// A network-level error occurred (DNS resolution failure, connection refused, etc.).
    NetworkError {
        /// Backend that produced the error.
        backend: String,
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    Timeout {
        /// Backend that produced the error.
        backend: String,
        /// Error details.
        detail: String,
    },

    /// The configured connection credentials are invalid or expired.
    InvalidCredentials {
        /// Backend that produced the error.
        backend: String,
        /// Original error message from the backend, if available.
        raw_message: Option<String>,
    },

    /// The specified domain record was not found.
    DomainNotFound {
        /// Backend that produced the error.
        backend: String,
        /// Domain name that was not found.
        domain: String,
    },

    /// The specified tag was not found.
    TagNotFound {
        /// Backend that produced the error.
        backend: String,
        /// Tag name that was not found.
        tag: String,
    },

    /// The named relation (table) does not exist on the backend.
    RelationNotFound {
        /// Backend that produced the error.
        backend: String,
        /// Relation name that was not found.
        relation: String,
        /// Original error message from the backend, if available.
        raw_message: Option<String>,
    },

    /// The backend rejected or failed to execute a statement.
    QueryFailed {
        /// Backend that produced the error.
        backend: String,
        /// Details about the failure.
        detail: String,
    },

    /// Failed to parse the backend's response.
    ParseError {
        /// Backend that produced the error.
        backend: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// Failed to serialize a request body.
    SerializationError {
        /// Backend that produced the error.
        backend: String,
        /// Details about the serialization failure.
        detail: String,
    },

    /// The authenticated session lacks permission for the requested operation
    /// (row-level security, revoked grants, etc.).
    PermissionDenied {
        /// Backend that produced the error.
        backend: String,
        /// Original error message from the backend, if available.
        raw_message: Option<String>,
    },

    /// A mutating operation was rejected by the write gate.
    ///
    /// Synthesized, never produced by a backend. Always displays
    /// "Write permissions disabled".
    WritesDisabled {
        /// Name of the rejected operation.
        operation: String,
    },

    /// No backend is configured for this session (stub backend).
    NotConfigured {
        /// Explanation attached at selection time.
        detail: String,
    },

    /// An unrecognized error from the backend.
    ///
    /// This is a catch-all for error codes not yet mapped to a specific variant.
    Unknown {
        /// Backend that produced the error.
        backend: String,
        /// Raw error code from the backend, if available.
        raw_code: Option<String>,
        /// Raw error message from the backend.
        raw_message: String,
    },
}

impl BackendError {
    /// 是否为预期行为（用户输入、资源不存在、写入被禁用等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::DomainNotFound { .. }
                | Self::TagNotFound { .. }
                | Self::PermissionDenied { .. }
                | Self::WritesDisabled { .. }
                | Self::NotConfigured { .. }
        )
    }

    /// 是否为写入门禁合成的拒绝（区别于真实后端失败）。
    #[must_use]
    pub fn is_write_denial(&self) -> bool {
        matches!(self, Self::WritesDisabled { .. })
    }
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { backend, detail } => {
                write!(f, "[{backend}] Network error: {detail}")
            }
            Self::Timeout { backend, detail } => {
                write!(f, "[{backend}] Request timeout: {detail}")
            }
            Self::InvalidCredentials {
                backend,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{backend}] Invalid credentials: {msg}")
                } else {
                    write!(f, "[{backend}] Invalid credentials")
                }
            }
            Self::DomainNotFound { backend, domain } => {
                write!(f, "[{backend}] Domain '{domain}' not found")
            }
            Self::TagNotFound { backend, tag } => {
                write!(f, "[{backend}] Tag '{tag}' not found")
            }
            Self::RelationNotFound {
                backend,
                relation,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{backend}] Relation '{relation}' not found: {msg}")
                } else {
                    write!(f, "[{backend}] Relation '{relation}' not found")
                }
            }
            Self::QueryFailed { backend, detail } => {
                write!(f, "[{backend}] Query failed: {detail}")
            }
            Self::ParseError { backend, detail } => {
                write!(f, "[{backend}] Parse error: {detail}")
            }
            Self::SerializationError { backend, detail } => {
                write!(f, "[{backend}] Serialization error: {detail}")
            }
            Self::PermissionDenied {
                backend,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{backend}] Permission denied: {msg}")
                } else {
                    write!(f, "[{backend}] Permission denied")
                }
            }
            Self::WritesDisabled { .. } => {
                write!(f, "Write permissions disabled")
            }
            Self::NotConfigured { detail } => {
                write!(f, "No backend configured: {detail}")
            }
            Self::Unknown {
                backend,
                raw_message,
                ..
            } => {
                write!(f, "[{backend}] {raw_message}")
            }
        }
    }
}

impl std::error::Error for BackendError {}

/// Convenience type alias for `Result<T, BackendError>`.
pub type Result<T> = std::result::Result<T, BackendError>;
