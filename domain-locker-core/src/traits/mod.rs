//! 存储与运行时抽象 Trait

mod credential_store;
mod feature_flag_store;

pub use credential_store::CredentialStore;
pub use feature_flag_store::{FLAG_WRITE_PERMISSIONS, FeatureFlagStore};
