//! API 成功响应包裹。

use axum::{Json, http::StatusCode};
use serde::Serialize;
use xl_shared_protocol::SuccessEnvelope;

/// 构造 200 成功响应（默认消息 `Success`）。
pub(crate) fn ok_response<T: Serialize>(data: T) -> (StatusCode, Json<SuccessEnvelope<T>>) {
    (StatusCode::OK, Json(SuccessEnvelope::new(data)))
}
