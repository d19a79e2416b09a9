//! Supabase 托管后端（PostgREST 声明式查询）

mod backend;
mod error;
mod http;
mod rows;

use reqwest::Client;

use crate::error::{BackendError, Result};
use crate::http_util::create_http_client;

/// Supabase 查询服务（托管客户端变体）
///
/// 以 `select=` / `eq.` 过滤器表达查询；REST 接口无法表达的
/// 连接/聚合（如按 ISP 统计主机）在内存中完成。
#[derive(Debug)]
pub struct SupabaseBackend {
    pub(crate) client: Client,
    /// 项目根 URL（不含 `/rest/v1` 后缀）
    pub(crate) base_url: String,
    pub(crate) anon_key: String,
}

impl SupabaseBackend {
    /// 构造后端；URL 无效时构造即失败（由选择器捕获进入错误态）
    pub fn new(url: String, anon_key: String) -> Result<Self> {
        let parsed = url::Url::parse(&url).map_err(|e| BackendError::InvalidCredentials {
            backend: "supabase".to_string(),
            raw_message: Some(format!("无效的项目 URL: {e}")),
        })?;
        if parsed.scheme() != "https" && parsed.scheme() != "http" {
            return Err(BackendError::InvalidCredentials {
                backend: "supabase".to_string(),
                raw_message: Some(format!("不支持的 URL scheme: {}", parsed.scheme())),
            });
        }
        Ok(Self {
            client: create_http_client(),
            base_url: url.trim_end_matches('/').to_string(),
            anon_key,
        })
    }
}
