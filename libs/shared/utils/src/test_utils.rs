use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;

use shared_config::AppConfig;
use shared_database::AppState;
use shared_models::auth::{AuthUser, Role};

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_service_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Point the database client at a mock server.
    pub fn with_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            jwt_ttl_minutes: 60,
            port: 0,
            no_show_sweep_enabled: false,
        }
    }

    pub fn to_state(&self) -> Arc<AppState> {
        AppState::shared(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: i64,
    pub name: String,
    pub role: Role,
}

impl TestUser {
    pub fn new(id: i64, name: &str, role: Role) -> Self {
        Self {
            id,
            name: name.to_string(),
            role,
        }
    }

    pub fn student(id: i64) -> Self {
        Self::new(id, "Test Student", Role::Student)
    }

    pub fn doctor(id: i64) -> Self {
        Self::new(id, "Dr. Test", Role::Doctor)
    }

    pub fn admin(id: i64) -> Self {
        Self::new(id, "Test Admin", Role::Admin)
    }

    pub fn pharmacist(id: i64) -> Self {
        Self::new(id, "Test Pharmacist", Role::Pharmacy)
    }

    pub fn to_auth_user(&self) -> AuthUser {
        AuthUser {
            id: self.id,
            role: self.role,
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "id": user.id,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Row builders shaped like the PostgREST responses the cells decode.
pub struct MockRows;

impl MockRows {
    pub fn doctor(id: i64, name: &str, specialization: Option<&str>, time_per_patient: Option<i32>) -> Value {
        json!({
            "id": id,
            "name": name,
            "email": format!("doctor{}@campus.test", id),
            "role": "doctor",
            "roll_number": null,
            "specialization": specialization,
            "time_per_patient": time_per_patient
        })
    }

    pub fn availability(id: i64, doctor_id: i64, date: &str, start: &str, end: &str, max_patients: Option<i32>) -> Value {
        json!({
            "id": id,
            "doctor_id": doctor_id,
            "date": date,
            "start_time": start,
            "end_time": end,
            "max_patients": max_patients
        })
    }

    pub fn appointment(id: i64, student_id: i64, doctor_id: i64, date: &str, time: &str, status: &str) -> Value {
        json!({
            "id": id,
            "student_id": student_id,
            "student_name": "Test Student",
            "doctor_id": doctor_id,
            "doctor_name": "Dr. Test",
            "date": date,
            "time": time,
            "status": status,
            "created_at": "2025-01-01T00:00:00Z"
        })
    }

    pub fn error(message: &str, code: &str) -> Value {
        json!({
            "code": code,
            "message": message,
            "details": null,
            "hint": null
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.supabase_service_key, "test-service-key");
        assert!(app_config.is_configured());
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::doctor(5);
        assert_eq!(user.role, Role::Doctor);
        assert_eq!(user.to_auth_user().id, 5);
    }

    #[test]
    fn test_jwt_token_creation() {
        let user = TestUser::student(1);
        let secret = "test-secret";
        let token = JwtTestUtils::create_test_token(&user, secret, Some(1));

        assert_eq!(token.split('.').count(), 3);
        assert_eq!(crate::jwt::validate_token(&token, secret).unwrap(), user.to_auth_user());
    }
}
