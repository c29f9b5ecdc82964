//! 内部接口拦截：校验 `X-Internal-Token`，失败直接返回 401，成功后交给下游 handler。

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};
use xl_shared_protocol::{AuthError, INTERNAL_TOKEN_HEADER, InvalidTokenReason};

use crate::{api::error::ApiError, state::AppState};

/// 受保护路由的前置校验；通过后把解码出的声明放入请求扩展。
pub(crate) async fn require_internal_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let verified = extract_token(request.headers())
        .and_then(|token| state.authority.verify_token(token));
    let claims = match verified {
        Ok(claims) => claims,
        Err(err) => {
            warn!(
                "internal auth rejected {} {}: {}",
                request.method(),
                request.uri().path(),
                err.code()
            );
            return Err(err.into());
        }
    };

    debug!(
        "internal caller authenticated: sub={} role={}",
        claims.subject, claims.role
    );
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// 读取 token 请求头；缺失视为未携带，非 UTF-8 视为格式错误。
fn extract_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let Some(value) = headers.get(INTERNAL_TOKEN_HEADER) else {
        return Err(AuthError::MissingToken);
    };
    value
        .to_str()
        .map_err(|_| AuthError::InvalidToken(InvalidTokenReason::Malformed))
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension, Router,
        body::{Body, to_bytes},
        http::{HeaderValue, Request, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
    };
    use serde_json::Value;
    use tower::ServiceExt;
    use xl_shared_protocol::{INTERNAL_ROLE, INTERNAL_TOKEN_HEADER, InternalClaims};

    use super::{extract_token, require_internal_auth};
    use crate::state::test_state;

    fn gated_router() -> Router {
        let state = test_state();
        Router::new()
            .route(
                "/gated",
                get(|Extension(claims): Extension<InternalClaims>| async move { claims.role }),
            )
            .route_layer(from_fn_with_state(state.clone(), require_internal_auth))
            .with_state(state)
    }

    #[tokio::test]
    async fn verified_claims_reach_the_handler() {
        let token = test_state().authority.issue_token().unwrap();
        let response = gated_router()
            .oneshot(
                Request::get("/gated")
                    .header("X-Internal-Token", token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], INTERNAL_ROLE.as_bytes());
    }

    #[tokio::test]
    async fn handler_is_not_reached_without_token() {
        let response = gated_router()
            .oneshot(Request::get("/gated").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"]["code"], "MISSING_TOKEN");
        assert_eq!(value["error"]["message"], "Internal token required");
    }

    #[test]
    fn non_utf8_header_is_malformed() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            INTERNAL_TOKEN_HEADER,
            HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap(),
        );

        let err = extract_token(&headers).unwrap_err();
        assert_eq!(err.code(), "INVALID_TOKEN");
    }
}
