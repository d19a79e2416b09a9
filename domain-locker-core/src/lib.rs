//! Domain Locker Core Library
//!
//! Business logic for domain portfolio management, including:
//! - Write gating (feature-flag controlled mutation access)
//! - Domain portfolio service (validation, expiry computation)
//! - Host management service
//! - Uptime monitoring and expiry reminders
//!
//! The library is platform-independent: the storage backend is abstracted
//! behind `QueryService` (from `domain-locker-backend`) and runtime concerns
//! like feature flags and credentials behind traits in [`traits`].

pub mod error;
pub mod services;
pub mod traits;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{BackendError, CoreError, CoreResult};
pub use services::{DomainService, HostService, MonitorService, ServiceContext, WriteGate};
pub use traits::{CredentialStore, FeatureFlagStore};
