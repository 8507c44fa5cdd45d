use serde_json::json;
use tracing::{error, info, instrument, warn};

use shared_config::AppConfig;
use shared_database::{AppState, DatabaseError, SupabaseClient};
use shared_models::auth::Role;
use shared_models::error::AppError;
use shared_utils::jwt::issue_token;

use crate::models::{Credentials, LoginRequest, PublicUser, SignupRequest, PUBLIC_USER_COLUMNS};
use crate::services::password::{hash_password, is_strong_enough, verify_password, WEAK_PASSWORD_MESSAGE};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Signed-in session: the user and their bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub role: Role,
    pub token: String,
}

pub struct AccountService {
    db: SupabaseClient,
    config: AppConfig,
}

impl AccountService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
            config: state.config.clone(),
        }
    }

    #[instrument(skip(self, request), fields(email = ?request.email))]
    pub async fn signup(&self, request: SignupRequest) -> Result<PublicUser, AppError> {
        let password = non_empty(&request.password)
            .ok_or_else(|| AppError::BadRequest("Password is required".to_string()))?;
        if !is_strong_enough(password) {
            return Err(AppError::BadRequest(WEAK_PASSWORD_MESSAGE.to_string()));
        }

        let (Some(name), Some(email)) = (non_empty(&request.name), non_empty(&request.email)) else {
            return Err(AppError::BadRequest("Name and email are required".to_string()));
        };

        let role = match non_empty(&request.role) {
            Some(raw) => raw
                .parse::<Role>()
                .map_err(|_| AppError::BadRequest("Invalid role".to_string()))?,
            None => Role::Student,
        };

        if matches!(request.time_per_patient, Some(minutes) if minutes <= 0) {
            return Err(AppError::BadRequest(
                "Time per patient must be greater than 0".to_string(),
            ));
        }

        let lookup = format!(
            "/rest/v1/users?email=eq.{}&select=id",
            urlencoding::encode(email)
        );
        let existing: Vec<serde_json::Value> = self.db.select(&lookup).await?;
        if !existing.is_empty() {
            warn!("Signup for existing email rejected");
            return Err(AppError::BadRequest("User already exists".to_string()));
        }

        let hash = hash_password(password).map_err(|e| {
            error!("Password hashing failed: {}", e);
            AppError::Internal("Server error".to_string())
        })?;

        let body = json!({
            "name": name,
            "email": email,
            "password": hash,
            "role": role,
            "roll_number": non_empty(&request.roll_no),
            "specialization": non_empty(&request.specialization),
            "time_per_patient": request.time_per_patient,
        });

        let path = format!("/rest/v1/users?select={}", PUBLIC_USER_COLUMNS);
        let rows: Vec<PublicUser> = self.db.insert(&path, body).await.map_err(|e| match e {
            DatabaseError::Conflict(_) => AppError::BadRequest("User already exists".to_string()),
            other => other.into(),
        })?;

        let user = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Database("insert returned no row".to_string()))?;
        info!("User {} signed up as {}", user.id, user.role);
        Ok(user)
    }

    #[instrument(skip(self, request), fields(email = ?request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<Session, AppError> {
        let invalid = || AppError::BadRequest(INVALID_CREDENTIALS.to_string());

        let (Some(email), Some(password)) = (non_empty(&request.email), request.password.as_deref()) else {
            return Err(invalid());
        };

        let path = format!(
            "/rest/v1/users?email=eq.{}&select=id,role,password",
            urlencoding::encode(email)
        );
        let credentials: Credentials = self.db.select_one(&path).await?.ok_or_else(invalid)?;

        let matches = verify_password(password, &credentials.password).unwrap_or_else(|e| {
            warn!("Stored hash for user {} unreadable: {}", credentials.id, e);
            false
        });
        if !matches {
            return Err(invalid());
        }

        if let Some(selected) = non_empty(&request.role) {
            if !credentials.role.as_str().eq_ignore_ascii_case(selected) {
                return Err(AppError::BadRequest("Invalid role selected".to_string()));
            }
        }

        let token = issue_token(
            credentials.id,
            credentials.role,
            &self.config.jwt_secret,
            self.config.jwt_ttl_minutes,
        )
        .map_err(|e| {
            error!("Token issue failed: {}", e);
            AppError::Internal("Server error".to_string())
        })?;

        info!("User {} logged in", credentials.id);
        Ok(Session {
            user_id: credentials.id,
            role: credentials.role,
            token,
        })
    }
}
