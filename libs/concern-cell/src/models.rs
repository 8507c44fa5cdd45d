use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConcernStatus {
    Pending,
    Responded,
}

/// A concern as its author sees it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Concern {
    pub id: i64,
    pub category: String,
    pub message: String,
    pub response: Option<String>,
    pub status: ConcernStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub responded_at: Option<DateTime<Utc>>,
}

/// The doctor-facing view. Carries no student identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnonymousConcern {
    pub id: i64,
    pub category: String,
    pub message: String,
    pub status: ConcernStatus,
    pub response: Option<String>,
    pub responded_by: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitConcernRequest {
    pub category: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyRequest {
    #[serde(alias = "response")]
    pub reply: Option<String>,
}
