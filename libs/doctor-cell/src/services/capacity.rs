use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, instrument};

use shared_database::{AppState, DatabaseError, SupabaseClient};

use crate::models::{
    AvailabilityWindow, Doctor, SlotAvailability, FULLY_BOOKED_MESSAGE, NOT_AVAILABLE_MESSAGE,
};

/// Minutes per consultation when the doctor never set one.
pub const DEFAULT_TIME_PER_PATIENT: i32 = 15;

pub fn effective_time_per_patient(configured: Option<i32>) -> i32 {
    match configured {
        Some(minutes) if minutes > 0 => minutes,
        _ => DEFAULT_TIME_PER_PATIENT,
    }
}

/// Start inclusive, end exclusive.
pub fn window_contains(window: &AvailabilityWindow, time: NaiveTime) -> bool {
    window.start_time <= time && time < window.end_time
}

/// Picks the window covering `time`. Overlaps resolve to the latest start.
pub fn select_window(windows: &[AvailabilityWindow], time: NaiveTime) -> Option<&AvailabilityWindow> {
    windows
        .iter()
        .filter(|w| window_contains(w, time))
        .max_by_key(|w| (w.start_time, w.id))
}

pub fn window_capacity(window: &AvailabilityWindow, time_per_patient: i32) -> i64 {
    match window.max_patients {
        Some(explicit) if explicit > 0 => i64::from(explicit),
        _ => {
            let minutes = (window.end_time - window.start_time).num_minutes().max(0);
            minutes / i64::from(effective_time_per_patient(Some(time_per_patient)))
        }
    }
}

pub fn evaluate(window: &AvailabilityWindow, time_per_patient: i32, current_bookings: i64) -> SlotAvailability {
    let capacity = window_capacity(window, time_per_patient);
    let available = current_bookings < capacity;

    SlotAvailability {
        available,
        window_id: Some(window.id),
        max_patients: Some(capacity),
        current_bookings: Some(current_bookings),
        time_per_patient: Some(time_per_patient),
        message: (!available).then(|| FULLY_BOOKED_MESSAGE.to_string()),
    }
}

pub struct CapacityService {
    db: SupabaseClient,
}

impl CapacityService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
        }
    }

    pub async fn time_per_patient(&self, doctor_id: i64) -> Result<i32, DatabaseError> {
        let path = format!(
            "/rest/v1/users?id=eq.{}&role=eq.doctor&select=id,name,specialization,time_per_patient",
            doctor_id
        );
        let doctor: Option<Doctor> = self.db.select_one(&path).await?;
        Ok(effective_time_per_patient(doctor.and_then(|d| d.time_per_patient)))
    }

    /// Scheduled bookings at exactly this doctor/date/time.
    pub async fn bookings_at(&self, doctor_id: i64, date: NaiveDate, time: NaiveTime) -> Result<i64, DatabaseError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=eq.{}&time=eq.{}&status=eq.scheduled",
            doctor_id,
            date,
            time.format("%H:%M:%S")
        );
        self.db.count(&path).await
    }

    #[instrument(skip(self))]
    pub async fn calculate_available_slots(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<SlotAvailability, DatabaseError> {
        let path = format!(
            "/rest/v1/doctor_availability?doctor_id=eq.{}&date=eq.{}&order=start_time.asc",
            doctor_id, date
        );
        let windows: Vec<AvailabilityWindow> = self.db.select(&path).await?;

        let Some(window) = select_window(&windows, time) else {
            debug!("No window covers {} {} for doctor {}", date, time, doctor_id);
            return Ok(SlotAvailability::unavailable(NOT_AVAILABLE_MESSAGE));
        };

        let time_per_patient = self.time_per_patient(doctor_id).await?;
        let current = self.bookings_at(doctor_id, date, time).await?;
        let result = evaluate(window, time_per_patient, current);

        debug!(
            "Window {} capacity {:?}, booked {}",
            window.id, result.max_patients, current
        );
        Ok(result)
    }
}
