use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReferralStatus {
    /// Anything other than an explicit approval is a rejection.
    pub fn decide(requested: Option<&str>) -> Self {
        match requested {
            Some(s) if s.trim().eq_ignore_ascii_case("approved") => ReferralStatus::Approved,
            _ => ReferralStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Referral {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    pub reason: Option<String>,
    pub status: ReferralStatus,
    #[serde(default)]
    pub doctor_notes: Option<String>,
    pub requested_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReferralRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReferralDecision {
    pub status: Option<String>,
}
