//! 通用 HTTP 工具
//!
//! 提供两个后端共用的请求处理逻辑：发送请求、日志、读取响应。
//! 各后端保留完整的请求构造灵活性，自行构造 `RequestBuilder`。
//! 失败的请求只向上浮一次，不做重试。

use std::time::Duration;

use reqwest::{Client, RequestBuilder};

use crate::error::BackendError;

/// 默认连接超时（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 日志中响应体的最大长度
const MAX_LOG_BODY_LEN: usize = 512;

/// 创建带超时配置的 HTTP Client
pub(crate) fn create_http_client() -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_default()
}

/// 截断过长的响应体用于日志输出
pub(crate) fn truncate_for_log(body: &str) -> String {
    if body.len() <= MAX_LOG_BODY_LEN {
        body.to_string()
    } else {
        let mut end = MAX_LOG_BODY_LEN;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... ({} bytes)", &body[..end], body.len())
    }
}

/// 执行 HTTP 请求并返回响应文本
///
/// 统一处理：发送请求、日志、超时/网络错误分类。
///
/// # Returns
/// * `Ok((status_code, response_text))` - 成功时返回状态码和响应文本
/// * `Err(BackendError::Timeout | BackendError::NetworkError)` - 网络层失败
pub(crate) async fn execute_request(
    request_builder: RequestBuilder,
    backend_name: &str,
    method_name: &str,
    url_or_relation: &str,
) -> Result<(u16, String), BackendError> {
    log::debug!("[{backend_name}] {method_name} {url_or_relation}");

    let response = request_builder.send().await.map_err(|e| {
        if e.is_timeout() {
            BackendError::Timeout {
                backend: backend_name.to_string(),
                detail: e.to_string(),
            }
        } else {
            BackendError::NetworkError {
                backend: backend_name.to_string(),
                detail: e.to_string(),
            }
        }
    })?;

    let status_code = response.status().as_u16();
    log::debug!("[{backend_name}] Response Status: {status_code}");

    let response_text = response
        .text()
        .await
        .map_err(|e| BackendError::NetworkError {
            backend: backend_name.to_string(),
            detail: format!("读取响应失败: {e}"),
        })?;

    log::debug!(
        "[{backend_name}] Response Body: {}",
        truncate_for_log(&response_text)
    );

    Ok((status_code, response_text))
}
