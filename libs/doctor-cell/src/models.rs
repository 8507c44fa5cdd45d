use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::DatabaseError;
use shared_models::error::AppError;

pub const NOT_AVAILABLE_MESSAGE: &str = "Doctor is not available at this time";
pub const FULLY_BOOKED_MESSAGE: &str = "This slot is fully booked";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub specialization: Option<String>,
    pub time_per_patient: Option<i32>,
}

/// A `doctor_availability` row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityWindow {
    pub id: i64,
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_patients: Option<i32>,
}

/// Availability as returned to clients, capacity resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityView {
    pub id: i64,
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_patients: i64,
    pub max_patients_explicit: bool,
    pub time_per_patient: i32,
    pub booked_appointments: i64,
}

/// Accepts both the camelCase form fields and the snake_case API names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetAvailabilityRequest {
    pub date: Option<String>,
    #[serde(alias = "startTime")]
    pub start_time: Option<String>,
    #[serde(alias = "endTime")]
    pub end_time: Option<String>,
    #[serde(alias = "maxPatients")]
    pub max_patients: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailabilityRangeQuery {
    #[serde(rename = "startDate", alias = "start_date")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate", alias = "end_date")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteAvailabilityQuery {
    pub force: Option<String>,
}

impl DeleteAvailabilityQuery {
    pub fn is_forced(&self) -> bool {
        self.force
            .as_deref()
            .map(|f| f.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// Result of the capacity check for one (doctor, date, time).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailability {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_patients: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_bookings: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_per_patient: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SlotAvailability {
    pub fn unavailable(message: &str) -> Self {
        Self {
            available: false,
            window_id: None,
            max_patients: None,
            current_bookings: None,
            time_per_patient: None,
            message: Some(message.to_string()),
        }
    }

    pub fn rejection_message(&self) -> &str {
        self.message.as_deref().unwrap_or(FULLY_BOOKED_MESSAGE)
    }
}

/// Row returned by the `force_delete_availability` Postgres function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForcedDeletion {
    pub deleted: AvailabilityWindow,
    pub cancelled_count: i64,
    pub notified_count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeletionOutcome {
    Deleted(AvailabilityWindow),
    Forced(ForcedDeletion),
}

#[derive(Error, Debug)]
pub enum AvailabilityError {
    #[error("Availability not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Cannot delete availability with booked appointments")]
    HasBookings,

    #[error("Forced deletion failed: {0}")]
    ForcedDeletionFailed(String),

    #[error("Unexpected store response: {0}")]
    Unexpected(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::NotFound => AppError::NotFound("Availability not found".to_string()),
            AvailabilityError::DoctorNotFound => AppError::NotFound("Doctor not found".to_string()),
            AvailabilityError::InvalidInput(msg) => AppError::BadRequest(msg),
            AvailabilityError::HasBookings => AppError::BadRequest(err.to_string()),
            AvailabilityError::ForcedDeletionFailed(_) => {
                AppError::Internal("Error deleting availability (forced)".to_string())
            }
            AvailabilityError::Unexpected(msg) => AppError::Database(msg),
            AvailabilityError::Database(e) => AppError::Database(e.to_string()),
        }
    }
}

/// `HH:MM` or `HH:MM:SS`, as sent by forms and returned by Postgres.
pub fn parse_clock_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
