use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecordCategory {
    /// Readable by every doctor.
    General,
    /// Readable only by doctors sharing the author's specialization.
    #[default]
    Specialized,
}

impl std::str::FromStr for RecordCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(RecordCategory::General),
            "specialized" => Ok(RecordCategory::Specialized),
            _ => Err(()),
        }
    }
}

/// A prescription / medical record row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prescription {
    pub id: i64,
    pub student_id: i64,
    pub doctor_id: Option<i64>,
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub category: RecordCategory,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    pub medicines: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRecordRequest {
    #[serde(alias = "studentId")]
    pub student_id: Option<i64>,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    pub medicines: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePrescriptionRequest {
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    pub medicines: Option<String>,
}

/// Author id and specialization, used by the visibility filter.
#[derive(Debug, Clone, Deserialize)]
pub struct DoctorSpecialization {
    pub id: i64,
    pub specialization: Option<String>,
}
