//! SQL 执行器 HTTP 请求方法

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::http_util::execute_request;
use crate::traits::{BackendErrorMapper, ErrorContext, RawBackendError};

use super::{PgConnection, PgExecutorBackend};

/// 执行器请求体
#[derive(Debug, Serialize)]
struct ExecutorRequest<'a> {
    query: &'a str,
    params: &'a [Value],
    credentials: &'a PgConnection,
}

/// 执行器响应体
///
/// 成功时带 `data`，失败时带 `error`（可选 SQLSTATE `code`）。
#[derive(Debug, Deserialize)]
struct ExecutorResponse {
    #[serde(default)]
    data: Option<Vec<Value>>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl PgExecutorBackend {
    /// 执行一条参数化语句，返回结果行
    ///
    /// 关系名不在此处传递：42P01 的关系名由映射层从服务端报文还原。
    pub(crate) async fn execute(&self, query: &str, params: Vec<Value>) -> Result<Vec<Value>> {
        let body = ExecutorRequest {
            query,
            params: &params,
            credentials: &self.connection,
        };

        let builder = self.client.post(&self.endpoint).json(&body);
        let (status, text) =
            execute_request(builder, self.backend_name(), "POST", &self.endpoint).await?;

        // 执行器对认证失败返回 401/403，正文仍是 JSON
        if status == 401 || status == 403 {
            let raw = serde_json::from_str::<ExecutorResponse>(&text)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(self.map_error(
                RawBackendError::with_code("28000", raw),
                ErrorContext::default(),
            ));
        }

        let response: ExecutorResponse =
            serde_json::from_str(&text).map_err(|e| self.parse_error(e))?;

        if let Some(message) = response.error {
            log::warn!("[postgres] 语句执行失败: {message}");
            let raw = match response.code {
                Some(code) => RawBackendError::with_code(code, message),
                None => RawBackendError::new(message),
            };
            return Err(self.map_error(raw, ErrorContext::default()));
        }

        Ok(response.data.unwrap_or_default())
    }
}
