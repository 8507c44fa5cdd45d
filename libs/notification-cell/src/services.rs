use serde_json::json;
use tracing::{info, instrument};

use shared_database::{AppState, SupabaseClient};
use shared_models::error::AppError;

use crate::models::{Notification, SendNotificationRequest};

const NOTIFICATIONS_PATH: &str = "/rest/v1/notifications";
const COLUMNS: &str = "id,message,is_read,created_at";

pub struct NotificationService {
    db: SupabaseClient,
}

impl NotificationService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
        }
    }

    pub async fn for_user(&self, user_id: i64) -> Result<Vec<Notification>, AppError> {
        let path = format!(
            "{}?user_id=eq.{}&select={}&order=created_at.desc",
            NOTIFICATIONS_PATH, user_id, COLUMNS
        );
        Ok(self.db.select(&path).await?)
    }

    pub async fn unread_for(&self, user_id: i64) -> Result<Vec<Notification>, AppError> {
        let path = format!(
            "{}?user_id=eq.{}&is_read=eq.false&select={}&order=created_at.desc",
            NOTIFICATIONS_PATH, user_id, COLUMNS
        );
        Ok(self.db.select(&path).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn send(&self, request: SendNotificationRequest) -> Result<Notification, AppError> {
        let message = request.message.as_deref().map(str::trim).filter(|m| !m.is_empty());
        let (Some(user_id), Some(message)) = (request.user_id.filter(|id| *id > 0), message) else {
            return Err(AppError::BadRequest("Missing fields".to_string()));
        };

        let rows: Vec<Notification> = self
            .db
            .insert(NOTIFICATIONS_PATH, json!({ "user_id": user_id, "message": message }))
            .await?;
        let notification = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Database("insert returned no row".to_string()))?;
        info!("Notification {} sent to user {}", notification.id, user_id);
        Ok(notification)
    }

    /// Only the recipient can mark a notification read.
    pub async fn mark_read(&self, user_id: i64, notification_id: i64) -> Result<Notification, AppError> {
        let path = format!(
            "{}?id=eq.{}&user_id=eq.{}",
            NOTIFICATIONS_PATH, notification_id, user_id
        );
        let rows: Vec<Notification> = self.db.update(&path, json!({ "is_read": true })).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))
    }
}
