//! 自托管 Postgres 后端（经远程 SQL 执行器端点）

mod backend;
mod error;
mod http;
mod rows;

use reqwest::Client;
use serde::Serialize;

use crate::http_util::create_http_client;

/// SQL 执行器会话凭证（随每次请求发送，在服务端建立连接）
#[derive(Debug, Clone, Serialize, PartialEq)]
pub(crate) struct PgConnection {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

/// Postgres 查询服务（SQL 执行器变体）
///
/// 所有操作构造参数化语句（`$1`、`$2`…），经单一 POST 端点执行，
/// 绝不字符串拼接不可信值。
pub struct PgExecutorBackend {
    pub(crate) client: Client,
    /// SQL 执行器 HTTP 端点
    pub(crate) endpoint: String,
    pub(crate) connection: PgConnection,
}

impl PgExecutorBackend {
    pub fn new(
        endpoint: String,
        host: String,
        port: u16,
        user: String,
        password: String,
        database: String,
    ) -> Self {
        Self {
            client: create_http_client(),
            endpoint,
            connection: PgConnection {
                host,
                port,
                user,
                password,
                database,
            },
        }
    }
}
