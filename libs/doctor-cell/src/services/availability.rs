use chrono::{Duration, Local, NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};

use shared_database::{AppState, SupabaseClient};

use crate::models::{
    parse_clock_time, parse_date, AvailabilityError, AvailabilityView, AvailabilityWindow,
    DeletionOutcome, ForcedDeletion, SetAvailabilityRequest,
};
use crate::services::capacity::{window_capacity, window_contains, CapacityService};

/// Days returned when a range query gives no end date.
pub const DEFAULT_RANGE_DAYS: i64 = 30;

const AVAILABILITY_PATH: &str = "/rest/v1/doctor_availability";

#[derive(Debug, Deserialize)]
struct BookedTime {
    date: NaiveDate,
    time: NaiveTime,
}

/// Validated form of a [`SetAvailabilityRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewWindow {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_patients: Option<i32>,
}

pub fn validate_window(request: &SetAvailabilityRequest) -> Result<NewWindow, AvailabilityError> {
    let (Some(date), Some(start), Some(end)) = (
        request.date.as_deref().filter(|s| !s.trim().is_empty()),
        request.start_time.as_deref().filter(|s| !s.trim().is_empty()),
        request.end_time.as_deref().filter(|s| !s.trim().is_empty()),
    ) else {
        return Err(AvailabilityError::InvalidInput(
            "Date, start time, and end time are required".to_string(),
        ));
    };

    let date = parse_date(date).ok_or_else(|| {
        AvailabilityError::InvalidInput("Invalid date format. Use YYYY-MM-DD".to_string())
    })?;
    let (Some(start_time), Some(end_time)) = (parse_clock_time(start), parse_clock_time(end)) else {
        return Err(AvailabilityError::InvalidInput(
            "Invalid time format. Use HH:mm (24-hour format)".to_string(),
        ));
    };

    if start_time >= end_time {
        return Err(AvailabilityError::InvalidInput(
            "Start time must be before end time".to_string(),
        ));
    }
    if matches!(request.max_patients, Some(max) if max <= 0) {
        return Err(AvailabilityError::InvalidInput(
            "Max patients must be greater than 0".to_string(),
        ));
    }

    Ok(NewWindow {
        date,
        start_time,
        end_time,
        max_patients: request.max_patients,
    })
}

/// Resolves `[startDate, endDate]`; defaults to today and thirty days on.
pub fn resolve_range(
    start: Option<&str>,
    end: Option<&str>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), AvailabilityError> {
    let invalid = || AvailabilityError::InvalidInput("Invalid date format. Use YYYY-MM-DD".to_string());

    let start = match start.filter(|s| !s.trim().is_empty()) {
        Some(raw) => parse_date(raw).ok_or_else(invalid)?,
        None => today,
    };
    let end = match end.filter(|s| !s.trim().is_empty()) {
        Some(raw) => parse_date(raw).ok_or_else(invalid)?,
        None => start + Duration::days(DEFAULT_RANGE_DAYS),
    };

    Ok((start, end))
}

fn to_view(window: AvailabilityWindow, time_per_patient: i32, booked: &[BookedTime]) -> AvailabilityView {
    let booked_appointments = booked
        .iter()
        .filter(|b| b.date == window.date && window_contains(&window, b.time))
        .count() as i64;

    AvailabilityView {
        max_patients: window_capacity(&window, time_per_patient),
        max_patients_explicit: matches!(window.max_patients, Some(max) if max > 0),
        time_per_patient,
        booked_appointments,
        id: window.id,
        doctor_id: window.doctor_id,
        date: window.date,
        start_time: window.start_time,
        end_time: window.end_time,
    }
}

pub struct AvailabilityService {
    db: SupabaseClient,
    capacity: CapacityService,
}

impl AvailabilityService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
            capacity: CapacityService::new(state),
        }
    }

    /// Create or update the window keyed on (doctor, date, start, end).
    #[instrument(skip(self, request))]
    pub async fn set_availability(
        &self,
        doctor_id: i64,
        request: SetAvailabilityRequest,
    ) -> Result<AvailabilityWindow, AvailabilityError> {
        let window = validate_window(&request).inspect_err(|e| warn!("Rejected availability: {}", e))?;

        let body = json!({
            "doctor_id": doctor_id,
            "date": window.date,
            "start_time": window.start_time.format("%H:%M:%S").to_string(),
            "end_time": window.end_time.format("%H:%M:%S").to_string(),
            "max_patients": window.max_patients,
        });

        let rows: Vec<AvailabilityWindow> = self
            .db
            .upsert(AVAILABILITY_PATH, "doctor_id,date,start_time,end_time", body)
            .await?;

        let saved = rows.into_iter().next().ok_or_else(|| {
            AvailabilityError::Unexpected("upsert returned no row".to_string())
        })?;

        info!("Availability {} saved for doctor {}", saved.id, doctor_id);
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn get_availability(
        &self,
        doctor_id: i64,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Vec<AvailabilityView>, AvailabilityError> {
        let (start, end) = resolve_range(start_date, end_date, Local::now().date_naive())?;
        debug!("Fetching availability for doctor {} from {} to {}", doctor_id, start, end);

        let path = format!(
            "{}?doctor_id=eq.{}&date=gte.{}&date=lte.{}&order=date.asc,start_time.asc",
            AVAILABILITY_PATH, doctor_id, start, end
        );
        let windows: Vec<AvailabilityWindow> = self.db.select(&path).await?;
        if windows.is_empty() {
            return Ok(Vec::new());
        }

        let time_per_patient = self.capacity.time_per_patient(doctor_id).await?;
        let booked_path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&status=eq.scheduled&date=gte.{}&date=lte.{}&select=date,time",
            doctor_id, start, end
        );
        let booked: Vec<BookedTime> = self.db.select(&booked_path).await?;

        Ok(windows
            .into_iter()
            .map(|w| to_view(w, time_per_patient, &booked))
            .collect())
    }

    /// Scheduled appointments inside `[start, end)` of the window.
    pub async fn occupancy(&self, window: &AvailabilityWindow) -> Result<i64, AvailabilityError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=eq.{}&time=gte.{}&time=lt.{}&status=eq.scheduled",
            window.doctor_id,
            window.date,
            window.start_time.format("%H:%M:%S"),
            window.end_time.format("%H:%M:%S")
        );
        Ok(self.db.count(&path).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_availability(
        &self,
        doctor_id: i64,
        availability_id: i64,
        force: bool,
    ) -> Result<DeletionOutcome, AvailabilityError> {
        let path = format!(
            "{}?id=eq.{}&doctor_id=eq.{}",
            AVAILABILITY_PATH, availability_id, doctor_id
        );
        let window: AvailabilityWindow = self
            .db
            .select_one(&path)
            .await?
            .ok_or(AvailabilityError::NotFound)?;

        let booked = self.occupancy(&window).await?;

        if booked == 0 {
            let deleted: Vec<AvailabilityWindow> = self.db.delete(&path).await?;
            let row = deleted.into_iter().next().ok_or(AvailabilityError::NotFound)?;
            info!("Availability {} deleted", availability_id);
            return Ok(DeletionOutcome::Deleted(row));
        }

        if !force {
            warn!(
                "Refusing to delete availability {} with {} booking(s)",
                availability_id, booked
            );
            return Err(AvailabilityError::HasBookings);
        }

        // Lock, cancel, notify and delete all happen inside one Postgres transaction.
        let result: ForcedDeletion = self
            .db
            .rpc(
                "force_delete_availability",
                json!({
                    "p_availability_id": availability_id,
                    "p_doctor_id": doctor_id,
                }),
            )
            .await
            .map_err(|e| {
                error!("Forced deletion of availability {} rolled back: {}", availability_id, e);
                AvailabilityError::ForcedDeletionFailed(e.to_string())
            })?;

        info!(
            "Availability {} force-deleted, {} cancelled, {} notified",
            availability_id, result.cancelled_count, result.notified_count
        );
        Ok(DeletionOutcome::Forced(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(date: &str, start: &str, end: &str, max: Option<i32>) -> SetAvailabilityRequest {
        SetAvailabilityRequest {
            date: Some(date.to_string()),
            start_time: Some(start.to_string()),
            end_time: Some(end.to_string()),
            max_patients: max,
        }
    }

    #[test]
    fn test_validate_window_requires_fields() {
        let err = validate_window(&SetAvailabilityRequest::default()).unwrap_err();
        assert_eq!(err.to_string(), "Date, start time, and end time are required");
    }

    #[test]
    fn test_validate_window_rejects_inverted_range() {
        let err = validate_window(&request("2025-03-01", "12:00", "09:00", None)).unwrap_err();
        assert_eq!(err.to_string(), "Start time must be before end time");

        let err = validate_window(&request("2025-03-01", "09:00", "09:00", None)).unwrap_err();
        assert_eq!(err.to_string(), "Start time must be before end time");
    }

    #[test]
    fn test_validate_window_rejects_non_positive_max() {
        let err = validate_window(&request("2025-03-01", "09:00", "12:00", Some(0))).unwrap_err();
        assert_eq!(err.to_string(), "Max patients must be greater than 0");
        assert!(validate_window(&request("2025-03-01", "09:00", "12:00", Some(3))).is_ok());
    }

    #[test]
    fn test_range_defaults() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let (start, end) = resolve_range(None, None, today).unwrap();
        assert_eq!(start, today);
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());

        let (start, end) = resolve_range(Some("2025-04-10"), None, today).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 4, 10).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 5, 10).unwrap());

        assert!(resolve_range(Some("10/04/2025"), None, today).is_err());
    }

    #[test]
    fn test_view_counts_bookings_inside_window() {
        let window = AvailabilityWindow {
            id: 1,
            doctor_id: 2,
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            max_patients: None,
        };
        let booked = vec![
            BookedTime { date: window.date, time: NaiveTime::from_hms_opt(9, 0, 0).unwrap() },
            BookedTime { date: window.date, time: NaiveTime::from_hms_opt(11, 30, 0).unwrap() },
            BookedTime { date: window.date, time: NaiveTime::from_hms_opt(12, 0, 0).unwrap() },
        ];

        let view = to_view(window, 30, &booked);
        assert_eq!(view.booked_appointments, 2);
        assert_eq!(view.max_patients, 6);
        assert!(!view.max_patients_explicit);
    }
}
