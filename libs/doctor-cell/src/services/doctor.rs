use tracing::debug;

use shared_database::{AppState, DatabaseError, SupabaseClient};

use crate::models::Doctor;

const DOCTOR_COLUMNS: &str = "id,name,specialization,time_per_patient";

pub struct DoctorService {
    db: SupabaseClient,
}

impl DoctorService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
        }
    }

    /// Public directory of doctors, ordered by name.
    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, DatabaseError> {
        debug!("Listing doctors");
        let path = format!(
            "/rest/v1/users?role=eq.doctor&select={}&order=name.asc",
            DOCTOR_COLUMNS
        );
        self.db.select(&path).await
    }

    /// `None` when the id is not a user with role doctor.
    pub async fn get_doctor(&self, doctor_id: i64) -> Result<Option<Doctor>, DatabaseError> {
        debug!("Fetching doctor {}", doctor_id);
        let path = format!(
            "/rest/v1/users?id=eq.{}&role=eq.doctor&select={}",
            doctor_id, DOCTOR_COLUMNS
        );
        self.db.select_one(&path).await
    }
}
