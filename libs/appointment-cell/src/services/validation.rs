// libs/appointment-cell/src/services/validation.rs
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde_json::Value;

use crate::models::{AppointmentError, BookAppointmentRequest, SlotRequest};

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern compiles"));

static TIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("time pattern compiles"));

/// `YYYY-MM-DD` that is also a real calendar date.
pub fn parse_booking_date(raw: &str) -> Result<NaiveDate, AppointmentError> {
    if !DATE_PATTERN.is_match(raw) {
        return Err(AppointmentError::InvalidDate);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| AppointmentError::InvalidDate)
}

/// Strict 24-hour `HH:mm`.
pub fn parse_booking_time(raw: &str) -> Result<NaiveTime, AppointmentError> {
    if !TIME_PATTERN.is_match(raw) {
        return Err(AppointmentError::InvalidTime);
    }
    NaiveTime::parse_from_str(raw, "%H:%M").map_err(|_| AppointmentError::InvalidTime)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// Checks run in a fixed order so clients see the first problem only.
pub fn validate_booking(request: &BookAppointmentRequest) -> Result<SlotRequest, AppointmentError> {
    let doctor_id = request.doctor_id.as_ref().filter(|v| !is_blank(v));
    let date = request.date.as_deref().filter(|s| !s.is_empty());
    let time = request.time.as_deref().filter(|s| !s.is_empty());

    let (Some(doctor_id), Some(date), Some(time)) = (doctor_id, date, time) else {
        return Err(AppointmentError::MissingFields);
    };

    let date = parse_booking_date(date)?;
    let time = parse_booking_time(time)?;

    let doctor_id = doctor_id
        .as_i64()
        .filter(|id| *id > 0)
        .ok_or(AppointmentError::InvalidDoctorId)?;

    Ok(SlotRequest { doctor_id, date, time })
}
