//! In-memory feature flag store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use domain_locker_core::traits::FeatureFlagStore;

/// In-memory flag store，启动时从配置注入，运行期可翻转。
///
/// 写入门禁每次写操作都会现查开关，因此 `set` 的效果对下一次
/// 调用立即可见。未设置的开关视为关闭。
pub struct StaticFlagStore {
    flags: RwLock<HashMap<String, bool>>,
}

impl StaticFlagStore {
    #[must_use]
    pub fn new(flags: HashMap<String, bool>) -> Self {
        Self {
            flags: RwLock::new(flags),
        }
    }

    /// 运行期翻转开关
    pub async fn set(&self, flag: &str, enabled: bool) {
        self.flags.write().await.insert(flag.to_string(), enabled);
    }
}

impl Default for StaticFlagStore {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

#[async_trait]
impl FeatureFlagStore for StaticFlagStore {
    async fn is_enabled(&self, flag: &str) -> bool {
        self.flags.read().await.get(flag).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_locker_core::traits::FLAG_WRITE_PERMISSIONS;

    #[tokio::test]
    async fn unknown_flag_is_disabled() {
        let store = StaticFlagStore::default();
        assert!(!store.is_enabled(FLAG_WRITE_PERMISSIONS).await);
    }

    #[tokio::test]
    async fn set_is_visible_to_next_lookup() {
        let store = StaticFlagStore::default();
        store.set(FLAG_WRITE_PERMISSIONS, true).await;
        assert!(store.is_enabled(FLAG_WRITE_PERMISSIONS).await);
    }
}
