//! File-based credential store.
//!
//! Stores the backend credentials as a single JSON document on disk. Intended
//! for self-hosted deployments where the config lives next to the service.

use std::path::PathBuf;

use async_trait::async_trait;
use domain_locker_backend::BackendCredentials;
use tokio::fs;

use domain_locker_core::error::{CoreError, CoreResult};
use domain_locker_core::traits::CredentialStore;

/// File-based credential store.
///
/// A missing file means "no backend configured" rather than an error, so a
/// fresh deployment boots into the error session instead of crashing.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> CoreResult<Option<BackendCredentials>> {
        let json = match fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CoreError::ConfigError(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };
        let credentials = serde_json::from_str(&json).map_err(|e| {
            CoreError::ConfigError(format!("invalid credentials in {}: {e}", self.path.display()))
        })?;
        Ok(Some(credentials))
    }

    async fn save(&self, credentials: &BackendCredentials) -> CoreResult<()> {
        let json = serde_json::to_string_pretty(credentials)
            .map_err(|e| CoreError::SerializationError(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                CoreError::ConfigError(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        fs::write(&self.path, json).await.map_err(|e| {
            CoreError::ConfigError(format!("failed to write {}: {e}", self.path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested/credentials.json"));

        let credentials = BackendCredentials::Supabase {
            url: "https://abc.supabase.co".to_string(),
            anon_key: "anon".to_string(),
        };
        store.save(&credentials).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.backend_kind(), "supabase");
    }

    #[tokio::test]
    async fn malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = FileCredentialStore::new(path);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, CoreError::ConfigError(_)));
    }
}
