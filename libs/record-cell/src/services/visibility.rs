use std::collections::HashMap;

use shared_models::auth::{AuthUser, Role};

use crate::models::{Prescription, RecordCategory};

/// Stored values compare as-is; a missing specialization never matches.
fn same_specialization(a: Option<&str>, b: Option<&str>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

/// Who is reading records, resolved once per request.
#[derive(Debug, Clone)]
pub enum Visibility {
    Admin,
    Student(i64),
    Doctor {
        id: i64,
        specialization: Option<String>,
    },
    Denied,
}

impl Visibility {
    pub fn for_user(user: &AuthUser, specialization: Option<String>) -> Self {
        match user.role {
            Role::Admin => Visibility::Admin,
            Role::Student => Visibility::Student(user.id),
            Role::Doctor => Visibility::Doctor {
                id: user.id,
                specialization,
            },
            Role::Pharmacy => Visibility::Denied,
        }
    }

    /// `authors` maps author doctor id to that doctor's specialization.
    pub fn permits(&self, record: &Prescription, authors: &HashMap<i64, Option<String>>) -> bool {
        match self {
            Visibility::Admin => true,
            Visibility::Student(id) => record.student_id == *id,
            Visibility::Doctor { id, specialization } => {
                if record.category == RecordCategory::General || record.doctor_id == Some(*id) {
                    return true;
                }
                let author = record
                    .doctor_id
                    .and_then(|author| authors.get(&author))
                    .and_then(|s| s.as_deref());
                same_specialization(specialization.as_deref(), author)
            }
            Visibility::Denied => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(category: RecordCategory, author: i64) -> Prescription {
        Prescription {
            id: 1,
            student_id: 10,
            doctor_id: Some(author),
            doctor_name: Some("Dr. Author".into()),
            category,
            diagnosis: Some("Sprain".into()),
            notes: None,
            medicines: None,
            date: None,
        }
    }

    fn doctor(id: i64, specialization: Option<&str>) -> Visibility {
        Visibility::Doctor {
            id,
            specialization: specialization.map(String::from),
        }
    }

    fn authors() -> HashMap<i64, Option<String>> {
        HashMap::from([
            (2, Some("Orthopedics".to_string())),
            (3, None),
        ])
    }

    #[test]
    fn test_specialized_needs_matching_specialization() {
        let specialized = record(RecordCategory::Specialized, 2);
        assert!(doctor(5, Some("Orthopedics")).permits(&specialized, &authors()));
        assert!(!doctor(6, Some("Cardiology")).permits(&specialized, &authors()));
        assert!(!doctor(7, None).permits(&specialized, &authors()));
    }

    #[test]
    fn test_specialization_match_is_exact() {
        let specialized = record(RecordCategory::Specialized, 2);
        assert!(!doctor(5, Some("orthopedics")).permits(&specialized, &authors()));
        assert!(!doctor(5, Some(" Orthopedics")).permits(&specialized, &authors()));
    }

    #[test]
    fn test_author_without_specialization_is_visible_only_to_author() {
        let specialized = record(RecordCategory::Specialized, 3);
        assert!(doctor(3, None).permits(&specialized, &authors()));
        assert!(!doctor(8, None).permits(&specialized, &authors()));
    }

    #[test]
    fn test_general_visible_to_all_doctors() {
        let general = record(RecordCategory::General, 2);
        assert!(doctor(6, Some("Cardiology")).permits(&general, &authors()));
        assert!(doctor(7, None).permits(&general, &authors()));
    }

    #[test]
    fn test_owner_student_and_admin_always_see() {
        let specialized = record(RecordCategory::Specialized, 2);
        assert!(Visibility::Student(10).permits(&specialized, &authors()));
        assert!(!Visibility::Student(11).permits(&specialized, &authors()));
        assert!(Visibility::Admin.permits(&specialized, &authors()));
        assert!(!Visibility::Denied.permits(&specialized, &authors()));
    }
}
