use std::collections::{BTreeSet, HashMap};

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, instrument, warn};

use shared_database::{AppState, SupabaseClient};
use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;

use crate::models::{
    DoctorSpecialization, NewRecordRequest, Prescription, RecordCategory, UpdatePrescriptionRequest,
};
use crate::services::visibility::Visibility;

const PRESCRIPTIONS_PATH: &str = "/rest/v1/prescriptions";

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Deserialize)]
struct DoctorProfile {
    name: String,
    specialization: Option<String>,
}

pub struct RecordService {
    db: SupabaseClient,
}

impl RecordService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
        }
    }

    async fn doctor_profile(&self, doctor_id: i64) -> Result<DoctorProfile, AppError> {
        let path = format!(
            "/rest/v1/users?id=eq.{}&role=eq.doctor&select=name,specialization",
            doctor_id
        );
        self.db
            .select_one(&path)
            .await?
            .ok_or_else(|| AppError::NotFound("Doctor not found".to_string()))
    }

    /// Resolves the caller's view, looking up a doctor's specialization.
    pub async fn visibility_for(&self, user: &AuthUser) -> Result<Visibility, AppError> {
        let specialization = if user.role == Role::Doctor {
            self.doctor_profile(user.id).await?.specialization
        } else {
            None
        };
        Ok(Visibility::for_user(user, specialization))
    }

    async fn author_specializations(
        &self,
        records: &[Prescription],
    ) -> Result<HashMap<i64, Option<String>>, AppError> {
        let ids: BTreeSet<i64> = records.iter().filter_map(|r| r.doctor_id).collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let list = ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",");
        let path = format!("/rest/v1/users?id=in.({})&select=id,specialization", list);
        let rows: Vec<DoctorSpecialization> = self.db.select(&path).await?;
        Ok(rows.into_iter().map(|r| (r.id, r.specialization)).collect())
    }

    #[instrument(skip(self, request))]
    pub async fn add_record(&self, doctor_id: i64, request: NewRecordRequest) -> Result<Prescription, AppError> {
        let (Some(student_id), Some(diagnosis)) = (request.student_id, non_empty(&request.diagnosis)) else {
            return Err(AppError::BadRequest("Student ID and diagnosis are required".to_string()));
        };

        let category = match non_empty(&request.category) {
            Some(raw) => raw
                .parse::<RecordCategory>()
                .map_err(|_| AppError::BadRequest("Category must be general or specialized".to_string()))?,
            None => RecordCategory::default(),
        };

        let doctor = self.doctor_profile(doctor_id).await?;
        let rows: Vec<Prescription> = self
            .db
            .insert(
                PRESCRIPTIONS_PATH,
                json!({
                    "student_id": student_id,
                    "doctor_id": doctor_id,
                    "doctor_name": doctor.name,
                    "category": category,
                    "diagnosis": diagnosis,
                    "notes": non_empty(&request.notes),
                    "medicines": non_empty(&request.medicines),
                    "date": chrono::Utc::now().date_naive(),
                }),
            )
            .await?;

        let record = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Database("insert returned no row".to_string()))?;
        info!("Record {} added for student {} by doctor {}", record.id, student_id, doctor_id);
        Ok(record)
    }

    pub async fn for_student(&self, student_id: i64) -> Result<Vec<Prescription>, AppError> {
        let path = format!("{}?student_id=eq.{}&order=date.desc", PRESCRIPTIONS_PATH, student_id);
        Ok(self.db.select(&path).await?)
    }

    /// A student's records filtered to what the requesting doctor may read.
    #[instrument(skip(self))]
    pub async fn for_doctor(&self, doctor: &AuthUser, student_id: i64) -> Result<Vec<Prescription>, AppError> {
        let visibility = self.visibility_for(doctor).await?;
        let records = self.for_student(student_id).await?;
        let authors = self.author_specializations(&records).await?;

        let total = records.len();
        let visible: Vec<Prescription> = records
            .into_iter()
            .filter(|r| visibility.permits(r, &authors))
            .collect();
        debug!("Doctor {} sees {} of {} records", doctor.id, visible.len(), total);
        Ok(visible)
    }

    async fn find(&self, record_id: i64) -> Result<Prescription, AppError> {
        let path = format!("{}?id=eq.{}", PRESCRIPTIONS_PATH, record_id);
        self.db
            .select_one(&path)
            .await?
            .ok_or_else(|| AppError::NotFound("Prescription not found".to_string()))
    }

    async fn ensure_readable(&self, user: &AuthUser, record: &Prescription) -> Result<(), AppError> {
        let visibility = self.visibility_for(user).await?;
        let authors = self.author_specializations(std::slice::from_ref(record)).await?;
        if visibility.permits(record, &authors) {
            Ok(())
        } else {
            warn!("User {} denied prescription {}", user.id, record.id);
            Err(AppError::Forbidden("Forbidden".to_string()))
        }
    }

    pub async fn get_prescription(&self, user: &AuthUser, record_id: i64) -> Result<Prescription, AppError> {
        let record = self.find(record_id).await?;
        self.ensure_readable(user, &record).await?;
        Ok(record)
    }

    #[instrument(skip(self, request))]
    pub async fn update_prescription(
        &self,
        doctor: &AuthUser,
        record_id: i64,
        request: UpdatePrescriptionRequest,
    ) -> Result<Prescription, AppError> {
        let mut body = Map::new();
        for (column, value) in [
            ("diagnosis", &request.diagnosis),
            ("notes", &request.notes),
            ("medicines", &request.medicines),
        ] {
            if let Some(value) = value {
                body.insert(column.into(), Value::String(value.clone()));
            }
        }
        if body.is_empty() {
            return Err(AppError::BadRequest("No fields to update".to_string()));
        }

        let record = self.find(record_id).await?;
        self.ensure_readable(doctor, &record).await?;

        let path = format!("{}?id=eq.{}", PRESCRIPTIONS_PATH, record_id);
        let rows: Vec<Prescription> = self.db.update(&path, Value::Object(body)).await?;
        let updated = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Prescription not found".to_string()))?;
        info!("Prescription {} updated by doctor {}", record_id, doctor.id);
        Ok(updated)
    }
}
