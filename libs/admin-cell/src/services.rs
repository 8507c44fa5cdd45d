use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use shared_database::{AppState, DatabaseError, SupabaseClient};

/// Headline counts for the admin overview.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemOverview {
    pub total_users: i64,
    pub total_doctors: i64,
    pub total_students: i64,
    pub total_pharmacy_staff: i64,
    pub total_appointments: i64,
    pub pending_concerns: i64,
    pub medicines_in_inventory: i64,
}

pub struct AdminService {
    db: SupabaseClient,
}

impl AdminService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
        }
    }

    /// Issues every count concurrently.
    #[instrument(skip(self))]
    pub async fn overview(&self) -> Result<SystemOverview, DatabaseError> {
        let (
            total_users,
            total_doctors,
            total_students,
            total_pharmacy_staff,
            total_appointments,
            pending_concerns,
            medicines_in_inventory,
        ) = futures::try_join!(
            self.db.count("/rest/v1/users?select=id"),
            self.db.count("/rest/v1/users?role=eq.doctor&select=id"),
            self.db.count("/rest/v1/users?role=eq.student&select=id"),
            self.db.count("/rest/v1/users?role=eq.pharmacy&select=id"),
            self.db.count("/rest/v1/appointments?select=id"),
            self.db.count("/rest/v1/concerns?status=eq.pending&select=id"),
            self.db.count("/rest/v1/medicines?select=id"),
        )?;

        let overview = SystemOverview {
            total_users,
            total_doctors,
            total_students,
            total_pharmacy_staff,
            total_appointments,
            pending_concerns,
            medicines_in_inventory,
        };
        debug!(?overview, "Overview computed");
        Ok(overview)
    }
}
