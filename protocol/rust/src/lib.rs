// 文件职责：
// 1) 定义 analytics/recommendation 等内部服务共用的响应包裹结构。
// 2) 提供内部服务间 token 的签发与校验。
// 3) 提供时间戳等跨服务一致的基础函数。

use chrono::Utc;

pub mod envelope;
pub mod internal_token;

pub use envelope::{ErrorBody, ErrorEnvelope, SuccessEnvelope};
pub use internal_token::{
    AuthError, INTERNAL_ROLE, INTERNAL_SUBJECT, INTERNAL_TOKEN_HEADER, InternalClaims,
    InternalTokenAuthority, InvalidTokenReason, TokenError,
};

/// 生成纳秒精度 UTC 时间戳（RFC3339）。
pub fn now_rfc3339_nanos() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)
}

/// 当前 unix 秒。
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
