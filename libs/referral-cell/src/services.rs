use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use shared_database::{AppState, SupabaseClient};
use shared_models::error::AppError;

use crate::models::{Referral, ReferralDecision, ReferralRequest, ReferralStatus};

const REFERRALS_PATH: &str = "/rest/v1/referrals";
const STUDENT_COLUMNS: &str = "id,reason,status,requested_at,doctor_notes";
const DOCTOR_COLUMNS: &str = "id,student_id,student_name,reason,status,requested_at";

#[derive(Deserialize)]
struct NameRow {
    name: String,
}

pub struct ReferralService {
    db: SupabaseClient,
}

impl ReferralService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
        }
    }

    async fn user_name(&self, user_id: i64) -> Result<Option<String>, AppError> {
        let path = format!("/rest/v1/users?id=eq.{}&select=name", user_id);
        let row: Option<NameRow> = self.db.select_one(&path).await?;
        Ok(row.map(|r| r.name))
    }

    #[instrument(skip(self, request))]
    pub async fn request(&self, student_id: i64, request: ReferralRequest) -> Result<Referral, AppError> {
        let reason = request
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| AppError::BadRequest("Reason is required".to_string()))?;

        let student_name = self
            .user_name(student_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;

        let rows: Vec<Referral> = self
            .db
            .insert(
                REFERRALS_PATH,
                json!({
                    "student_id": student_id,
                    "student_name": student_name,
                    "reason": reason,
                    "status": ReferralStatus::Pending,
                }),
            )
            .await?;

        let referral = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Database("insert returned no row".to_string()))?;
        info!("Referral {} requested by student {}", referral.id, student_id);
        Ok(referral)
    }

    pub async fn for_student(&self, student_id: i64) -> Result<Vec<Referral>, AppError> {
        let path = format!(
            "{}?student_id=eq.{}&select={}&order=requested_at.desc",
            REFERRALS_PATH, student_id, STUDENT_COLUMNS
        );
        Ok(self.db.select(&path).await?)
    }

    pub async fn pending(&self) -> Result<Vec<Referral>, AppError> {
        let path = format!(
            "{}?status=eq.pending&select={}&order=requested_at.desc",
            REFERRALS_PATH, DOCTOR_COLUMNS
        );
        Ok(self.db.select(&path).await?)
    }

    #[instrument(skip(self, decision))]
    pub async fn decide(
        &self,
        doctor_id: i64,
        referral_id: i64,
        decision: ReferralDecision,
    ) -> Result<Referral, AppError> {
        let status = ReferralStatus::decide(decision.status.as_deref());
        let doctor_name = match self.user_name(doctor_id).await? {
            Some(name) => name,
            None => {
                warn!("Reviewing doctor {} has no user row", doctor_id);
                return Err(AppError::NotFound("Doctor not found".to_string()));
            }
        };

        let path = format!("{}?id=eq.{}", REFERRALS_PATH, referral_id);
        let rows: Vec<Referral> = self
            .db
            .update(
                &path,
                json!({
                    "status": status,
                    "doctor_notes": format!("Reviewed by {}", doctor_name),
                }),
            )
            .await?;

        let referral = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Referral not found".to_string()))?;
        info!("Referral {} marked {:?} by doctor {}", referral_id, status, doctor_id);
        Ok(referral)
    }
}
