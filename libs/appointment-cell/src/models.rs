// libs/appointment-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use shared_database::DatabaseError;
use shared_models::error::AppError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: i64,
    pub student_id: i64,
    pub student_name: Option<String>,
    pub doctor_id: i64,
    pub doctor_name: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl Appointment {
    pub fn involves(&self, user_id: i64) -> bool {
        self.student_id == user_id || self.doctor_id == user_id
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Cancelled,
    Completed,
    NoShow,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// `doctor_id` stays untyped so a string or float is reported as invalid
/// instead of failing JSON extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Option<Value>,
    pub date: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RescheduleRequest {
    pub date: Option<String>,
    pub time: Option<String>,
    pub new_date: Option<String>,
    pub new_time: Option<String>,
}

impl RescheduleRequest {
    /// `{date, time}` wins over `{new_date, new_time}` field by field.
    pub fn target(&self) -> (Option<&str>, Option<&str>) {
        fn pick<'a>(a: &'a Option<String>, b: &'a Option<String>) -> Option<&'a str> {
            a.as_deref()
                .filter(|s| !s.is_empty())
                .or_else(|| b.as_deref().filter(|s| !s.is_empty()))
        }
        (pick(&self.date, &self.new_date), pick(&self.time, &self.new_time))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorAppointmentsQuery {
    pub doctor_id: Option<i64>,
}

/// A booking request that passed input validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotRequest {
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("doctor_id, date, and time are required")]
    MissingFields,

    #[error("Both date and time are required for rescheduling. Use either {{date, time}} or {{new_date, new_time}} format.")]
    MissingRescheduleFields,

    #[error("Invalid date format. Use YYYY-MM-DD")]
    InvalidDate,

    #[error("Invalid time format. Use HH:mm (24-hour format)")]
    InvalidTime,

    #[error("Invalid doctor_id. Must be a positive integer")]
    InvalidDoctorId,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Student not found")]
    StudentNotFound,

    #[error("{0}")]
    SlotUnavailable(String),

    #[error("Student already has an appointment with this doctor at this time")]
    DuplicateBooking,

    #[error("Appointment not found")]
    NotFound,

    #[error("Can only reschedule appointments that are currently scheduled")]
    NotReschedulable,

    #[error("Doctor not available at this slot")]
    SlotTaken,

    #[error("Doctor id is required")]
    MissingDoctorId,

    #[error("Forbidden")]
    Forbidden,

    #[error("Forbidden: Access denied")]
    NotParticipant,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::DoctorNotFound
            | AppointmentError::StudentNotFound
            | AppointmentError::NotFound => AppError::NotFound(err.to_string()),
            AppointmentError::Forbidden | AppointmentError::NotParticipant => {
                AppError::Forbidden(err.to_string())
            }
            AppointmentError::DuplicateBooking | AppointmentError::SlotTaken => {
                AppError::Conflict(err.to_string())
            }
            AppointmentError::Database(e) => AppError::Database(e.to_string()),
            _ => AppError::BadRequest(err.to_string()),
        }
    }
}
