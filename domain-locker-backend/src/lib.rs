//! # domain-locker-backend
//!
//! A unified data-access abstraction for domain portfolio storage, with
//! interchangeable backends behind a single async trait.
//!
//! ## Supported Backends
//!
//! | Backend | Feature Flag | Transport |
//! |---------|-------------|-----------|
//! | Self-hosted Postgres | `postgres` | HTTP SQL executor endpoint |
//! | [Supabase](https://supabase.com/) | `supabase` | PostgREST (`/rest/v1`) |
//!
//! Both backends implement [`QueryService`] and return identical normalized
//! structures, so callers hold an `Arc<dyn QueryService>` and never branch on
//! which backend is underneath.
//!
//! ## Feature Flags
//!
//! ### Backend Selection
//!
//! - **`all-backends`** *(default)* — Enable both backends listed above.
//! - **`postgres`** — Enable only the SQL-executor backend.
//! - **`supabase`** — Enable only the Supabase backend.
//!
//! ### TLS Backend
//!
//! - **`native-tls`** *(default)* — Use the platform's native TLS implementation.
//! - **`rustls`** — Use rustls. Recommended for cross-compilation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domain_locker_backend::{create_backend, BackendCredentials, QueryService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Create a backend from credentials
//!     let credentials = BackendCredentials::Supabase {
//!         url: "https://your-project.supabase.co".to_string(),
//!         anon_key: "your-anon-key".to_string(),
//!     };
//!     let backend = create_backend(&credentials)?;
//!
//!     // 2. Validate connectivity
//!     backend.validate_connection().await?;
//!
//!     // 3. List domains
//!     for domain in backend.list_domains().await? {
//!         println!("{} expires {:?}", domain.domain_name, domain.expiry_date);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, BackendError>`](BackendError). Backend-native
//! failures (SQLSTATE codes, PostgREST error bodies) are mapped to structured
//! variants before they cross the crate boundary:
//!
//! - [`BackendError::InvalidCredentials`] — authentication failed
//! - [`BackendError::DomainNotFound`] — requested domain does not exist
//! - [`BackendError::WritesDisabled`] — a write was rejected by a write gate
//! - [`BackendError::NetworkError`] — connectivity issue
//!
//! No operation is retried; a failed call surfaces its error immediately.

mod backends;
mod error;
mod factory;
mod http_util;
mod traits;
mod types;

// Re-export error types
pub use error::{BackendError, Result};

// Re-export factory function
pub use factory::create_backend;

// Re-export the service trait (error-mapper trait stays internal)
pub use traits::QueryService;

// Re-export backend implementations for direct construction
#[cfg(feature = "postgres")]
pub use backends::PgExecutorBackend;
#[cfg(feature = "supabase")]
pub use backends::SupabaseBackend;

// Re-export types
pub use types::{
    BackendCredentials, Domain, DomainCosting, DomainUpdate, Host, HostDomainCount, IpAddress,
    Link, NotificationPreference, Registrar, SaveDomainRequest, SslInfo, StatusSummary, Subdomain,
    SubdomainGroup, Tag, UptimeCheck, WhoisInfo,
};
