//! Supabase REST 请求方法（PostgREST 风格）

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BackendError, Result};
use crate::http_util::execute_request;
use crate::traits::{BackendErrorMapper, ErrorContext, RawBackendError};

use super::SupabaseBackend;

/// PostgREST 错误响应体
#[derive(Debug, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// 构造 `column=eq.{value}` 过滤器（值经 URL 编码）
pub(crate) fn eq_filter(column: &str, value: &str) -> String {
    format!("{column}=eq.{}", urlencoding::encode(value))
}

impl SupabaseBackend {
    fn rest_url(&self, relation: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}/rest/v1/{relation}", self.base_url)
        } else {
            format!("{}/rest/v1/{relation}?{query}", self.base_url)
        }
    }

    fn auth_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
    }

    /// 检查状态码并把 PostgREST 错误体映射到统一错误
    fn check_status(&self, status: u16, text: &str, relation: &str) -> Result<()> {
        if (200..300).contains(&status) {
            return Ok(());
        }

        let context = ErrorContext {
            relation: Some(relation.to_string()),
        };

        // 401/403 优先按状态码分类，正文仅作补充信息
        if status == 401 {
            return Err(BackendError::InvalidCredentials {
                backend: self.backend_name().to_string(),
                raw_message: Some(text.to_string()),
            });
        }
        if status == 403 {
            return Err(BackendError::PermissionDenied {
                backend: self.backend_name().to_string(),
                raw_message: Some(text.to_string()),
            });
        }

        match serde_json::from_str::<PostgrestError>(text) {
            Ok(err) => {
                log::warn!("[supabase] API 错误: {}", err.message);
                let raw = match err.code {
                    Some(code) => RawBackendError::with_code(code, err.message),
                    None => RawBackendError::new(err.message),
                };
                Err(self.map_error(raw, context))
            }
            Err(_) => Err(self.map_error(
                RawBackendError::new(format!("HTTP {status}: {text}")),
                context,
            )),
        }
    }

    /// GET（select + 过滤器）
    pub(crate) async fn rest_get(&self, relation: &str, query: &str) -> Result<Vec<Value>> {
        let url = self.rest_url(relation, query);
        let builder = self.auth_headers(self.client.get(&url));
        let (status, text) = execute_request(builder, self.backend_name(), "GET", &url).await?;
        self.check_status(status, &text, relation)?;
        serde_json::from_str(&text).map_err(|e| self.parse_error(e))
    }

    /// POST（插入，带 `Prefer: return=representation`）
    pub(crate) async fn rest_post<B: Serialize>(
        &self,
        relation: &str,
        body: &B,
    ) -> Result<Vec<Value>> {
        let url = self.rest_url(relation, "");
        let builder = self
            .auth_headers(self.client.post(&url))
            .header("Prefer", "return=representation")
            .json(body);
        let (status, text) = execute_request(builder, self.backend_name(), "POST", &url).await?;
        self.check_status(status, &text, relation)?;
        serde_json::from_str(&text).map_err(|e| self.parse_error(e))
    }

    /// PATCH（按过滤器更新，返回受影响行）
    pub(crate) async fn rest_patch<B: Serialize>(
        &self,
        relation: &str,
        filter: &str,
        body: &B,
    ) -> Result<Vec<Value>> {
        let url = self.rest_url(relation, filter);
        let builder = self
            .auth_headers(self.client.patch(&url))
            .header("Prefer", "return=representation")
            .json(body);
        let (status, text) = execute_request(builder, self.backend_name(), "PATCH", &url).await?;
        self.check_status(status, &text, relation)?;
        serde_json::from_str(&text).map_err(|e| self.parse_error(e))
    }

    /// DELETE（按过滤器删除，返回被删行）
    pub(crate) async fn rest_delete(&self, relation: &str, filter: &str) -> Result<Vec<Value>> {
        let url = self.rest_url(relation, filter);
        let builder = self
            .auth_headers(self.client.delete(&url))
            .header("Prefer", "return=representation");
        let (status, text) = execute_request(builder, self.backend_name(), "DELETE", &url).await?;
        self.check_status(status, &text, relation)?;
        serde_json::from_str(&text).map_err(|e| self.parse_error(e))
    }
}
