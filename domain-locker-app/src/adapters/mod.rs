//! Platform-agnostic adapters for self-hosted frontends (server, CLI).

mod file_credential_store;
mod static_flag_store;

pub use file_credential_store::FileCredentialStore;
pub use static_flag_store::StaticFlagStore;
