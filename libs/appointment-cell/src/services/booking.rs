// libs/appointment-cell/src/services/booking.rs
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use doctor_cell::services::{CapacityService, DoctorService};
use shared_database::{AppState, DatabaseError, SupabaseClient};
use shared_models::auth::AuthUser;

use crate::models::{Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest, SlotRequest};
use crate::services::validation::validate_booking;

#[derive(Debug, Deserialize)]
struct UserName {
    name: String,
}

pub struct AppointmentBookingService {
    db: SupabaseClient,
    capacity: CapacityService,
    doctors: DoctorService,
}

impl AppointmentBookingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
            capacity: CapacityService::new(state),
            doctors: DoctorService::new(state),
        }
    }

    /// Validate, check the doctor, capacity and duplicates, then insert a
    /// `scheduled` row with name snapshots.
    #[instrument(skip(self, request), fields(student_id = student.id))]
    pub async fn book_appointment(
        &self,
        student: AuthUser,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let slot = validate_booking(&request).inspect_err(|e| warn!("Rejected booking: {}", e))?;

        let doctor = self
            .doctors
            .get_doctor(slot.doctor_id)
            .await?
            .ok_or(AppointmentError::DoctorNotFound)?;

        let availability = self
            .capacity
            .calculate_available_slots(slot.doctor_id, slot.date, slot.time)
            .await?;
        if !availability.available {
            debug!("Slot {} {} unavailable for doctor {}", slot.date, slot.time, slot.doctor_id);
            return Err(AppointmentError::SlotUnavailable(
                availability.rejection_message().to_string(),
            ));
        }

        if self.has_active_booking(student.id, &slot).await? {
            return Err(AppointmentError::DuplicateBooking);
        }

        let student_path = format!("/rest/v1/users?id=eq.{}&select=name", student.id);
        let student_name = self
            .db
            .select_one::<UserName>(&student_path)
            .await?
            .ok_or(AppointmentError::StudentNotFound)?
            .name;

        let body = json!({
            "student_id": student.id,
            "student_name": student_name,
            "doctor_id": slot.doctor_id,
            "doctor_name": doctor.name,
            "date": slot.date,
            "time": slot.time.format("%H:%M:%S").to_string(),
            "status": AppointmentStatus::Scheduled,
        });

        // The partial unique index catches a duplicate that raced past the check.
        let rows: Vec<Appointment> = self
            .db
            .insert("/rest/v1/appointments", body)
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict(_) => AppointmentError::DuplicateBooking,
                other => AppointmentError::Database(other),
            })?;

        let appointment = rows.into_iter().next().ok_or(AppointmentError::NotFound)?;
        info!(
            "Appointment {} booked with doctor {} on {} at {}",
            appointment.id, appointment.doctor_id, appointment.date, appointment.time
        );
        Ok(appointment)
    }

    async fn has_active_booking(&self, student_id: i64, slot: &SlotRequest) -> Result<bool, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?student_id=eq.{}&doctor_id=eq.{}&date=eq.{}&time=eq.{}&status=neq.cancelled",
            student_id,
            slot.doctor_id,
            slot.date,
            slot.time.format("%H:%M:%S")
        );
        Ok(self.db.count(&path).await? > 0)
    }
}
