//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use domain_locker_backend::{
    BackendCredentials, Host, QueryService, SaveDomainRequest, Tag, create_backend,
};

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Option` 为 `Some`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// 集成测试上下文
pub struct TestContext {
    pub backend: Arc<dyn QueryService>,
}

impl TestContext {
    /// 从环境变量构建 SQL 执行器后端
    ///
    /// 需要: `DL_PG_ENDPOINT` `DL_PG_HOST` `DL_PG_USER` `DL_PG_PASSWORD` `DL_PG_DATABASE`
    pub fn postgres() -> Option<Self> {
        let credentials = BackendCredentials::Postgres {
            endpoint: env::var("DL_PG_ENDPOINT").ok()?,
            host: env::var("DL_PG_HOST").ok()?,
            port: env::var("DL_PG_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5432),
            user: env::var("DL_PG_USER").ok()?,
            password: env::var("DL_PG_PASSWORD").ok()?,
            database: env::var("DL_PG_DATABASE").ok()?,
        };
        let backend = create_backend(&credentials).ok()?;
        Some(Self { backend })
    }

    /// 从环境变量构建 Supabase 后端
    ///
    /// 需要: `DL_SUPABASE_URL` `DL_SUPABASE_ANON_KEY`
    pub fn supabase() -> Option<Self> {
        let credentials = BackendCredentials::Supabase {
            url: env::var("DL_SUPABASE_URL").ok()?,
            anon_key: env::var("DL_SUPABASE_ANON_KEY").ok()?,
        };
        let backend = create_backend(&credentials).ok()?;
        Some(Self { backend })
    }
}

/// 生成唯一的测试域名
pub fn generate_test_domain_name() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("test-{}.example.com", &uuid.to_string()[..8])
}

/// 生成唯一的测试标签名
pub fn generate_test_tag_name() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("test-tag-{}", &uuid.to_string()[..8])
}

/// 生成唯一的测试 ISP 名
pub fn generate_test_isp_name() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("Test ISP {}", &uuid.to_string()[..8])
}

/// 最小化的域名保存请求
pub fn minimal_save_request(domain_name: &str) -> SaveDomainRequest {
    SaveDomainRequest {
        domain_name: domain_name.to_string(),
        registrar: None,
        expiry_date: None,
        notes: None,
        tags: Vec::new(),
    }
}

/// 测试用主机记录
pub fn test_host(isp: &str) -> Host {
    Host {
        isp: isp.to_string(),
        org: Some("Test Org".to_string()),
        as_number: Some("AS64500".to_string()),
        city: Some("Falkenstein".to_string()),
        region: None,
        country: Some("DE".to_string()),
        lat: None,
        lon: None,
    }
}

/// 测试用标签
pub fn test_tag(name: &str) -> Tag {
    Tag {
        name: name.to_string(),
        color: "blue".to_string(),
        icon: Some("server".to_string()),
    }
}
