//! 统一 HTTP 响应包裹：成功为 `success/data/message/timestamp`，失败为 `success/error/timestamp`。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::now_rfc3339_nanos;

/// 成功响应默认消息。
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Success";

/// 成功响应包裹。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessEnvelope<T> {
    // 恒为 true。
    pub success: bool,
    // 业务负载。
    pub data: T,
    // 人类可读消息。
    pub message: String,
    // 响应时间（RFC3339 UTC）。
    pub timestamp: String,
}

impl<T> SuccessEnvelope<T> {
    /// 使用默认消息构造成功响应。
    pub fn new(data: T) -> Self {
        Self::with_message(data, DEFAULT_SUCCESS_MESSAGE)
    }

    /// 使用自定义消息构造成功响应。
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
            timestamp: now_rfc3339_nanos(),
        }
    }
}

/// 失败响应中的错误体。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    // 机器可读错误码（如 `MISSING_TOKEN`）。
    pub code: String,
    // 人类可读错误描述。
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    // 附加诊断信息（可选）。
    pub details: Option<Value>,
}

/// 失败响应包裹。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    // 恒为 false。
    pub success: bool,
    pub error: ErrorBody,
    pub timestamp: String,
}

impl ErrorEnvelope {
    /// 构造失败响应。
    pub fn new(code: impl Into<String>, message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                details,
            },
            timestamp: now_rfc3339_nanos(),
        }
    }
}
