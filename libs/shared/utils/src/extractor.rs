use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use headers::{Cookie, HeaderMapExt};
use tracing::debug;

use shared_database::AppState;
use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;

use crate::jwt::validate_token;

pub const TOKEN_COOKIE: &str = "token";

pub const STUDENT_ONLY: &[Role] = &[Role::Student];
pub const DOCTOR_ONLY: &[Role] = &[Role::Doctor];
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const PHARMACY_ONLY: &[Role] = &[Role::Pharmacy];
pub const DOCTOR_OR_ADMIN: &[Role] = &[Role::Doctor, Role::Admin];

/// Bearer header wins; the `token` cookie is the fallback for browser sessions.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .typed_get::<Cookie>()
        .and_then(|cookie| cookie.get(TOKEN_COOKIE).map(str::to_string))
        .filter(|token| !token.is_empty())
}

// Middleware for authentication
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized("No token provided".to_string()))?;

    let user = validate_token(&token, &state.config.jwt_secret).map_err(|e| {
        debug!("JWT verification failed: {}", e);
        AppError::Forbidden("Invalid or expired token".to_string())
    })?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Role gate. Layer it inside `auth_middleware`.
pub async fn authorize(
    State(roles): State<&'static [Role]>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = extract_user(&request)?;

    if !user.has_role(roles) {
        debug!("User {} with role {} denied (needs one of {:?})", user.id, user.role, roles);
        return Err(AppError::Forbidden("Forbidden".to_string()));
    }

    Ok(next.run(request).await)
}

pub fn extract_user<B>(request: &Request<B>) -> Result<AuthUser, AppError> {
    request
        .extensions()
        .get::<AuthUser>()
        .copied()
        .ok_or_else(|| AppError::Unauthorized("User not found in request extensions".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{header::COOKIE, HeaderValue, StatusCode},
        middleware,
        routing::get,
        Extension, Router,
    };
    use tower::ServiceExt;

    use crate::test_utils::{JwtTestUtils, TestConfig, TestUser};

    async fn whoami(Extension(user): Extension<AuthUser>) -> String {
        format!("{}:{}", user.id, user.role)
    }

    fn app() -> Router {
        let state = TestConfig::default().to_state();
        Router::new()
            .route("/whoami", get(whoami))
            .route(
                "/doctors-only",
                get(whoami).route_layer(middleware::from_fn_with_state(DOCTOR_ONLY, authorize)),
            )
            .layer(middleware::from_fn_with_state(state, auth_middleware))
    }

    #[test]
    fn test_extract_token_prefers_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer header-token"));
        headers.insert(COOKIE, HeaderValue::from_static("token=cookie-token"));
        assert_eq!(extract_token(&headers).as_deref(), Some("header-token"));

        headers.remove(AUTHORIZATION);
        assert_eq!(extract_token(&headers).as_deref(), Some("cookie-token"));

        headers.remove(COOKIE);
        assert_eq!(extract_token(&headers), None);
    }

    #[tokio::test]
    async fn test_missing_token_is_401() {
        let response = app()
            .oneshot(Request::get("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_token_is_403() {
        let secret = TestConfig::default().jwt_secret;
        let tokens = [
            JwtTestUtils::create_invalid_signature_token(&TestUser::student(1)),
            JwtTestUtils::create_expired_token(&TestUser::student(1), &secret),
            JwtTestUtils::create_malformed_token(),
        ];

        for token in tokens {
            let response = app()
                .oneshot(
                    Request::get("/whoami")
                        .header(AUTHORIZATION, format!("Bearer {}", token))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", token);
        }
    }

    #[tokio::test]
    async fn test_cookie_token_accepted() {
        let config = TestConfig::default();
        let token = JwtTestUtils::create_test_token(&TestUser::student(7), &config.jwt_secret, Some(1));
        let response = app()
            .oneshot(
                Request::get("/whoami")
                    .header(COOKIE, format!("token={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_role_gate() {
        let config = TestConfig::default();
        let student = JwtTestUtils::create_test_token(&TestUser::student(7), &config.jwt_secret, Some(1));
        let doctor = JwtTestUtils::create_test_token(&TestUser::doctor(8), &config.jwt_secret, Some(1));

        let denied = app()
            .oneshot(
                Request::get("/doctors-only")
                    .header(AUTHORIZATION, format!("Bearer {}", student))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);

        let allowed = app()
            .oneshot(
                Request::get("/doctors-only")
                    .header(AUTHORIZATION, format!("Bearer {}", doctor))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(allowed.status(), StatusCode::OK);
    }
}
