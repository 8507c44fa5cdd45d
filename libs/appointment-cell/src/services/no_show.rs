// libs/appointment-cell/src/services/no_show.rs
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tracing::{error, info};

use shared_database::{AppState, DatabaseError, SupabaseClient};

use crate::models::AppointmentStatus;

/// Local wall-clock time of the daily sweep.
pub const SWEEP_AT: (u32, u32) = (0, 1);

/// Time left until the next `SWEEP_AT`, strictly in the future.
pub fn until_next_sweep(now: NaiveDateTime) -> StdDuration {
    let at = NaiveTime::from_hms_opt(SWEEP_AT.0, SWEEP_AT.1, 0).unwrap_or(NaiveTime::MIN);
    let today_run = now.date().and_time(at);
    let next = if today_run > now {
        today_run
    } else {
        today_run + Duration::days(1)
    };
    (next - now).to_std().unwrap_or(StdDuration::from_secs(60))
}

pub struct NoShowSweep {
    db: SupabaseClient,
}

impl NoShowSweep {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
        }
    }

    /// One bulk update: `scheduled` before `today` becomes `no_show`.
    pub async fn run_once(&self, today: NaiveDate) -> Result<usize, DatabaseError> {
        let path = format!(
            "/rest/v1/appointments?status=eq.scheduled&date=lt.{}&select=id",
            today
        );
        let rows: Vec<Value> = self
            .db
            .update(&path, json!({ "status": AppointmentStatus::NoShow }))
            .await?;
        Ok(rows.len())
    }

    /// Runs forever; failures are logged and the next day is tried again.
    pub fn spawn_daily(state: Arc<AppState>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let sweep = NoShowSweep::new(&state);
            loop {
                let wait = until_next_sweep(Local::now().naive_local());
                info!("Next no-show sweep in {}s", wait.as_secs());
                tokio::time::sleep(wait).await;

                let today = Local::now().date_naive();
                match sweep.run_once(today).await {
                    Ok(count) => info!("No-show sweep marked {} appointment(s)", count),
                    Err(e) => error!("No-show sweep failed: {}", e),
                }
            }
        })
    }
}
