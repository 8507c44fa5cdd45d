use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};

use shared_database::AppState;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::response::{self, ApiResponse};

use crate::models::SendNotificationRequest;
use crate::services::NotificationService;

pub async fn get_notifications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<ApiResponse, AppError> {
    let notifications = NotificationService::new(&state).for_user(user.id).await?;
    Ok(response::listing(&notifications))
}

pub async fn send_notification(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SendNotificationRequest>,
) -> Result<ApiResponse, AppError> {
    let notification = NotificationService::new(&state).send(request).await?;
    Ok(response::ok_with_message("Notification sent successfully", notification))
}

pub async fn mark_as_read(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(notification_id): Path<i64>,
) -> Result<ApiResponse, AppError> {
    let notification = NotificationService::new(&state)
        .mark_read(user.id, notification_id)
        .await?;
    Ok(response::ok_with_message("Notification marked as read", notification))
}
