//! 功能开关抽象 Trait

use async_trait::async_trait;

/// 写权限开关：为 `false` 时写入门禁拒绝所有写操作
pub const FLAG_WRITE_PERMISSIONS: &str = "writePermissions";

/// 功能开关 Trait
///
/// 开关值在每次查询时读取，不做缓存：部署方可在运行期翻转开关，
/// 下一次写操作即生效。未知开关一律视为关闭。
#[async_trait]
pub trait FeatureFlagStore: Send + Sync {
    /// 查询开关是否开启
    async fn is_enabled(&self, flag: &str) -> bool;
}
