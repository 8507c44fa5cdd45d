use serde::{Deserialize, Serialize};

use shared_models::auth::Role;

/// Columns safe to return to clients.
pub const PUBLIC_USER_COLUMNS: &str = "id,name,email,role,roll_number,specialization,time_per_patient";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    #[serde(alias = "roll_number")]
    pub roll_no: Option<String>,
    pub specialization: Option<String>,
    #[serde(alias = "timePerPatient")]
    pub time_per_patient: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    #[serde(alias = "roll_number")]
    pub roll_no: Option<String>,
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimePerPatientRequest {
    #[serde(alias = "timePerPatient")]
    pub time_per_patient: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub roll_number: Option<String>,
    pub specialization: Option<String>,
    pub time_per_patient: Option<i32>,
}

/// Row used only for credential checks.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub id: i64,
    pub role: Role,
    pub password: String,
}
