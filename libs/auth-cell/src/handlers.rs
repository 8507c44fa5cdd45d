use std::sync::Arc;

use axum::{
    extract::{Extension, Json, Path, State},
    http::{
        header::{CACHE_CONTROL, EXPIRES, PRAGMA},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::json;
use tracing::{debug, error};

use shared_database::AppState;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::response::{self, ApiResponse};
use shared_utils::extractor::TOKEN_COOKIE;

use crate::models::{LoginRequest, SignupRequest, TimePerPatientRequest, UpdateUserRequest};
use crate::services::users::ensure_self_or_admin;
use crate::services::{AccountService, UserService};

fn session_cookie(token: &str, ttl_minutes: i64) -> Result<Cookie<'static>, AppError> {
    let raw = format!("{}={}; Max-Age={}", TOKEN_COOKIE, token, ttl_minutes * 60);
    let mut cookie = Cookie::parse(raw).map_err(|e| {
        error!("Session cookie rejected: {}", e);
        AppError::Internal("Server error".to_string())
    })?;
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    Ok(cookie)
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignupRequest>,
) -> Result<ApiResponse, AppError> {
    let user = AccountService::new(&state).signup(request).await?;
    Ok(response::created(user))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, ApiResponse), AppError> {
    let session = AccountService::new(&state).login(request).await?;
    debug!("Issuing session cookie for user {}", session.user_id);

    let jar = jar.add(session_cookie(&session.token, state.config.jwt_ttl_minutes)?);
    let body = json!({ "success": true, "token": session.token, "role": session.role });

    Ok((jar, (StatusCode::OK, axum::Json(body))))
}

pub async fn logout(jar: CookieJar) -> Response {
    let jar = jar.remove(Cookie::build(TOKEN_COOKIE).path("/"));

    let mut response = (jar, response::message("Logged out successfully")).into_response();
    let headers = response.headers_mut();
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate, private"),
    );
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(EXPIRES, HeaderValue::from_static("0"));
    response
}

// ==============================================================================
// USERS
// ==============================================================================

pub async fn list_users(State(state): State<Arc<AppState>>) -> Result<ApiResponse, AppError> {
    let users = UserService::new(&state).list_users().await?;
    Ok(response::listing(&users))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> Result<ApiResponse, AppError> {
    ensure_self_or_admin(&user, user_id)?;
    let found = UserService::new(&state).get_user(user_id).await?;
    Ok(response::ok(found))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<ApiResponse, AppError> {
    let updated = UserService::new(&state)
        .update_user(&user, user_id, request)
        .await?;
    Ok(response::ok(updated))
}

pub async fn set_time_per_patient(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<TimePerPatientRequest>,
) -> Result<ApiResponse, AppError> {
    let doctor = UserService::new(&state)
        .set_time_per_patient(user.id, request.time_per_patient)
        .await?;
    Ok(response::ok_with_message("Time per patient updated", doctor))
}
