// libs/appointment-cell/src/services/lifecycle.rs
use chrono::NaiveDate;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use shared_database::{AppState, SupabaseClient};
use shared_models::auth::{AuthUser, Role};

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, DoctorAppointmentsQuery, RescheduleRequest,
};
use crate::services::validation::{parse_booking_date, parse_booking_time};

const APPOINTMENTS_PATH: &str = "/rest/v1/appointments";

/// Resolves which doctor's schedule the caller may read.
pub fn resolve_doctor_scope(user: &AuthUser, query: &DoctorAppointmentsQuery) -> Result<i64, AppointmentError> {
    match user.role {
        Role::Admin => query.doctor_id.ok_or(AppointmentError::MissingDoctorId),
        Role::Doctor => match query.doctor_id {
            Some(id) if id != user.id => Err(AppointmentError::Forbidden),
            _ => Ok(user.id),
        },
        _ => Err(AppointmentError::Forbidden),
    }
}

pub struct AppointmentLifecycleService {
    db: SupabaseClient,
}

impl AppointmentLifecycleService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
        }
    }

    pub async fn get_appointment(&self, appointment_id: i64) -> Result<Appointment, AppointmentError> {
        let path = format!("{}?id=eq.{}", APPOINTMENTS_PATH, appointment_id);
        self.db
            .select_one(&path)
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    pub async fn student_appointments(&self, student_id: i64) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Listing appointments for student {}", student_id);
        let path = format!(
            "{}?student_id=eq.{}&order=date.asc,time.asc",
            APPOINTMENTS_PATH, student_id
        );
        Ok(self.db.select(&path).await?)
    }

    /// Scheduled appointments on or after `today`.
    pub async fn upcoming_for_student(
        &self,
        student_id: i64,
        today: NaiveDate,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "{}?student_id=eq.{}&status=eq.scheduled&date=gte.{}&order=date.asc,time.asc",
            APPOINTMENTS_PATH, student_id, today
        );
        Ok(self.db.select(&path).await?)
    }

    pub async fn doctor_appointments(&self, doctor_id: i64) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Listing appointments for doctor {}", doctor_id);
        let path = format!(
            "{}?doctor_id=eq.{}&order=date.asc,time.asc",
            APPOINTMENTS_PATH, doctor_id
        );
        Ok(self.db.select(&path).await?)
    }

    pub async fn all_appointments(&self) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!("{}?order=date.desc,time.desc", APPOINTMENTS_PATH);
        Ok(self.db.select(&path).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn reschedule_appointment(
        &self,
        appointment_id: i64,
        request: RescheduleRequest,
    ) -> Result<Appointment, AppointmentError> {
        let (Some(date), Some(time)) = request.target() else {
            return Err(AppointmentError::MissingRescheduleFields);
        };
        let date = parse_booking_date(date)?;
        let time = parse_booking_time(time)?;

        let current = self.get_appointment(appointment_id).await?;
        if current.status != AppointmentStatus::Scheduled {
            warn!("Appointment {} is {}, not reschedulable", appointment_id, current.status);
            return Err(AppointmentError::NotReschedulable);
        }

        let clash_path = format!(
            "{}?id=neq.{}&doctor_id=eq.{}&date=eq.{}&time=eq.{}&status=eq.scheduled",
            APPOINTMENTS_PATH,
            appointment_id,
            current.doctor_id,
            date,
            time.format("%H:%M:%S")
        );
        if self.db.count(&clash_path).await? > 0 {
            return Err(AppointmentError::SlotTaken);
        }

        let path = format!("{}?id=eq.{}", APPOINTMENTS_PATH, appointment_id);
        let rows: Vec<Appointment> = self
            .db
            .update(
                &path,
                json!({ "date": date, "time": time.format("%H:%M:%S").to_string() }),
            )
            .await?;

        let updated = rows.into_iter().next().ok_or(AppointmentError::NotFound)?;
        info!("Appointment {} moved to {} {}", appointment_id, date, time);
        Ok(updated)
    }

    /// Sets `cancelled` regardless of the current status.
    #[instrument(skip(self))]
    pub async fn cancel_appointment(&self, appointment_id: i64) -> Result<(), AppointmentError> {
        let path = format!("{}?id=eq.{}", APPOINTMENTS_PATH, appointment_id);
        let _: Vec<Appointment> = self
            .db
            .update(&path, json!({ "status": AppointmentStatus::Cancelled }))
            .await?;
        info!("Appointment {} cancelled", appointment_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn user(id: i64, role: Role) -> AuthUser {
        AuthUser { id, role }
    }

    #[test]
    fn test_doctor_scope_defaults_to_self() {
        let query = DoctorAppointmentsQuery::default();
        assert_eq!(resolve_doctor_scope(&user(2, Role::Doctor), &query).unwrap(), 2);

        let own = DoctorAppointmentsQuery { doctor_id: Some(2) };
        assert_eq!(resolve_doctor_scope(&user(2, Role::Doctor), &own).unwrap(), 2);
    }

    #[test]
    fn test_doctor_cannot_read_other_schedule() {
        let other = DoctorAppointmentsQuery { doctor_id: Some(3) };
        assert_matches!(
            resolve_doctor_scope(&user(2, Role::Doctor), &other),
            Err(AppointmentError::Forbidden)
        );
    }

    #[test]
    fn test_admin_must_name_doctor() {
        assert_matches!(
            resolve_doctor_scope(&user(9, Role::Admin), &DoctorAppointmentsQuery::default()),
            Err(AppointmentError::MissingDoctorId)
        );
        let query = DoctorAppointmentsQuery { doctor_id: Some(3) };
        assert_eq!(resolve_doctor_scope(&user(9, Role::Admin), &query).unwrap(), 3);
    }

    #[test]
    fn test_reschedule_accepts_either_field_pair() {
        let request = RescheduleRequest {
            new_date: Some("2025-03-02".into()),
            new_time: Some("10:00".into()),
            ..Default::default()
        };
        assert_eq!(request.target(), (Some("2025-03-02"), Some("10:00")));

        let request = RescheduleRequest {
            date: Some("2025-03-03".into()),
            time: Some("11:00".into()),
            new_date: Some("2025-03-02".into()),
            new_time: None,
        };
        assert_eq!(request.target(), (Some("2025-03-03"), Some("11:00")));
    }
}
