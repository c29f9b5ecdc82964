//! 分析接口 HTTP 处理函数（均挂在内部鉴权之后）。

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;
use xl_shared_protocol::SuccessEnvelope;

use crate::{
    analytics::service::{DEFAULT_PERIOD, DashboardStats, UserBehavior},
    api::{error::ApiError, response::ok_response},
    state::AppState,
};

/// 仪表盘查询参数。
#[derive(Debug, Deserialize)]
pub(crate) struct DashboardQuery {
    pub(crate) period: Option<String>,
    pub(crate) start_date: Option<String>,
    pub(crate) end_date: Option<String>,
}

/// 仪表盘统计接口。
pub(crate) async fn dashboard_handler(
    State(state): State<AppState>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<(StatusCode, Json<SuccessEnvelope<DashboardStats>>), ApiError> {
    let Query(query) = query.map_err(|rejection| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "INVALID_PARAMETER",
            "invalid query parameters",
        )
        .with_details(json!({ "reason": rejection.body_text() }))
    })?;
    let period = query.period.as_deref().unwrap_or(DEFAULT_PERIOD);
    let stats = state
        .analytics
        .dashboard_stats(
            period,
            query.start_date.as_deref(),
            query.end_date.as_deref(),
            Utc::now().naive_utc(),
        )
        .map_err(|err| {
            warn!("get dashboard stats failed: {err}");
            ApiError::new(StatusCode::BAD_REQUEST, "ANALYTICS_ERROR", err)
        })?;
    Ok(ok_response(stats))
}

/// 用户行为分析接口。
pub(crate) async fn user_behavior_handler(
    State(state): State<AppState>,
    user_id: Result<Path<i64>, PathRejection>,
) -> Result<(StatusCode, Json<SuccessEnvelope<UserBehavior>>), ApiError> {
    let Path(user_id) = user_id.map_err(|rejection| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "INVALID_PARAMETER",
            "user_id must be an integer",
        )
        .with_details(json!({ "reason": rejection.body_text() }))
    })?;
    Ok(ok_response(state.analytics.user_behavior(user_id)))
}
