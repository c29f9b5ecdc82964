//! analytics 应用装配：路由、内部鉴权、CORS 与监听。

use axum::{
    Json, Router,
    http::{HeaderName, Method, header::CONTENT_TYPE},
    middleware::from_fn_with_state,
    routing::get,
};
use serde_json::{Value, json};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use xl_shared_protocol::{INTERNAL_TOKEN_HEADER, now_rfc3339_nanos};

use crate::{
    analytics::handlers::{dashboard_handler, user_behavior_handler},
    auth::middleware::require_internal_auth,
    config::Config,
    state::AppState,
};

/// 服务名。
pub(crate) const SERVICE_NAME: &str = "analytics-service";

/// 组装路由：`/v1/analytics/*` 全部要求内部 token，健康检查不鉴权。
pub(crate) fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(INTERNAL_TOKEN_HEADER)]);

    let analytics = Router::new()
        .route("/dashboard", get(dashboard_handler))
        .route("/users/{user_id}/behavior", get(user_behavior_handler))
        .route_layer(from_fn_with_state(state.clone(), require_internal_auth));

    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .nest("/v1/analytics", analytics)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// analytics 入口：构建状态并启动 HTTP 监听。
pub(crate) async fn run(config: Config) -> anyhow::Result<()> {
    if config.uses_default_secret() {
        warn!("INTERNAL_JWT_SECRET not set; using the development default secret");
    }
    let state = AppState::new(&config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    info!(
        "{SERVICE_NAME} listening on {} (env={})",
        config.addr,
        config.environment.as_str()
    );
    axum::serve(listener, app).await?;
    Ok(())
}

/// 健康检查接口。
async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": now_rfc3339_nanos(),
    }))
}

/// 就绪检查接口。
async fn ready() -> Json<Value> {
    Json(json!({
        "status": "ready",
        "service": SERVICE_NAME,
    }))
}
