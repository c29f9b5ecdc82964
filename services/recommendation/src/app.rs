//! recommendation 应用装配：路由、CORS 与监听。

use axum::{
    Json, Router,
    extract::{Path, rejection::PathRejection},
    http::{Method, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use serde_json::{Value, json};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use xl_shared_protocol::{ErrorEnvelope, SuccessEnvelope};

/// 服务名。
const SERVICE_NAME: &str = "recommendation-service";
/// 未设置 `PORT` 时的默认端口。
const DEFAULT_PORT: u16 = 5002;

/// 用户商品推荐结果。
#[derive(Debug, Clone, Serialize)]
pub(crate) struct RecommendationsData {
    pub(crate) user_id: i64,
    /// 推荐引擎尚未接入，始终为空列表。
    pub(crate) recommendations: Vec<Value>,
}

/// 由 `PORT` 推导监听地址；非法端口回退默认值。
pub(crate) fn listen_addr(port: Option<&str>) -> String {
    let port = match port.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
            warn!("invalid PORT {raw:?}; falling back to {DEFAULT_PORT}");
            DEFAULT_PORT
        }),
        None => DEFAULT_PORT,
    };
    format!("0.0.0.0:{port}")
}

/// 组装路由。
pub(crate) fn router() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route(
            "/v1/recommendations/users/{user_id}/products",
            get(recommendations_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// recommendation 入口：启动 HTTP 监听。
pub(crate) async fn run(addr: String) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("{SERVICE_NAME} listening on {addr}");
    axum::serve(listener, router()).await?;
    Ok(())
}

/// 健康检查接口。
async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
    }))
}

/// 商品推荐接口（推荐列表暂为空）。
async fn recommendations_handler(user_id: Result<Path<i64>, PathRejection>) -> Response {
    match user_id {
        Ok(Path(user_id)) => Json(SuccessEnvelope::new(RecommendationsData {
            user_id,
            recommendations: Vec::new(),
        }))
        .into_response(),
        Err(rejection) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorEnvelope::new(
                "INVALID_PARAMETER",
                "user_id must be an integer",
                Some(json!({ "reason": rejection.body_text() })),
            )),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::{listen_addr, router};

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = router()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn health_reports_service_name() {
        let (status, body) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "recommendation-service");
    }

    #[tokio::test]
    async fn recommendations_use_success_envelope() {
        let (status, body) = get_json("/v1/recommendations/users/7/products").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Success");
        assert_eq!(body["data"]["user_id"], 7);
        assert_eq!(body["data"]["recommendations"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn non_integer_user_id_is_bad_request() {
        let (status, body) = get_json("/v1/recommendations/users/seven/products").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "INVALID_PARAMETER");
    }

    #[test]
    fn listen_addr_falls_back_to_default_port() {
        assert_eq!(listen_addr(None), "0.0.0.0:5002");
        assert_eq!(listen_addr(Some("8080")), "0.0.0.0:8080");
        assert_eq!(listen_addr(Some("")), "0.0.0.0:5002");
        assert_eq!(listen_addr(Some("http")), "0.0.0.0:5002");
    }
}
