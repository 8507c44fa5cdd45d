use serde_json::json;
use tracing::{debug, info, instrument};

use shared_database::{AppState, SupabaseClient};
use shared_models::error::AppError;

use crate::models::{AnonymousConcern, Concern, ConcernStatus, ReplyRequest, SubmitConcernRequest};

const CONCERNS_PATH: &str = "/rest/v1/concerns";
const STUDENT_COLUMNS: &str = "id,category,message,response,status,created_at,responded_at";
const DOCTOR_COLUMNS: &str = "id,category,message,status,response,responded_by";

fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub struct ConcernService {
    db: SupabaseClient,
}

impl ConcernService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
        }
    }

    #[instrument(skip(self, request))]
    pub async fn submit(&self, student_id: i64, request: SubmitConcernRequest) -> Result<Concern, AppError> {
        let (Some(category), Some(message)) = (required(&request.category), required(&request.message)) else {
            return Err(AppError::BadRequest("Category and message are required".to_string()));
        };

        let path = format!("{}?select={}", CONCERNS_PATH, STUDENT_COLUMNS);
        let rows: Vec<Concern> = self
            .db
            .insert(
                &path,
                json!({
                    "student_id": student_id,
                    "category": category,
                    "message": message,
                    "status": ConcernStatus::Pending,
                }),
            )
            .await?;

        let concern = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Database("insert returned no row".to_string()))?;
        info!("Concern {} submitted", concern.id);
        Ok(concern)
    }

    pub async fn for_student(&self, student_id: i64) -> Result<Vec<Concern>, AppError> {
        let path = format!(
            "{}?student_id=eq.{}&select={}&order=id.desc",
            CONCERNS_PATH, student_id, STUDENT_COLUMNS
        );
        Ok(self.db.select(&path).await?)
    }

    /// Pending concerns plus those this doctor answered.
    pub async fn for_doctor(&self, doctor_id: i64) -> Result<Vec<AnonymousConcern>, AppError> {
        debug!("Listing concerns visible to doctor {}", doctor_id);
        let path = format!(
            "{}?or=(responded_by.eq.{},status.eq.pending)&select={}&order=id.desc",
            CONCERNS_PATH, doctor_id, DOCTOR_COLUMNS
        );
        Ok(self.db.select(&path).await?)
    }

    pub async fn pending(&self) -> Result<Vec<AnonymousConcern>, AppError> {
        let path = format!(
            "{}?status=eq.pending&select={}&order=id.desc",
            CONCERNS_PATH, DOCTOR_COLUMNS
        );
        Ok(self.db.select(&path).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn reply(
        &self,
        doctor_id: i64,
        concern_id: i64,
        request: ReplyRequest,
    ) -> Result<AnonymousConcern, AppError> {
        let reply = required(&request.reply)
            .ok_or_else(|| AppError::BadRequest("Reply is required".to_string()))?;

        let path = format!("{}?id=eq.{}&select={}", CONCERNS_PATH, concern_id, DOCTOR_COLUMNS);
        let rows: Vec<AnonymousConcern> = self
            .db
            .update(
                &path,
                json!({
                    "response": reply,
                    "responded_by": doctor_id,
                    "status": ConcernStatus::Responded,
                    "responded_at": chrono::Utc::now(),
                }),
            )
            .await?;

        let concern = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Concern not found".to_string()))?;
        info!("Concern {} answered by doctor {}", concern_id, doctor_id);
        Ok(concern)
    }
}
