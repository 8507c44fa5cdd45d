use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use shared_database::{AppState, SupabaseClient};
use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;

use crate::models::{PublicUser, UpdateUserRequest, PUBLIC_USER_COLUMNS};

/// Self or admin.
pub fn ensure_self_or_admin(actor: &AuthUser, user_id: i64) -> Result<(), AppError> {
    if actor.id == user_id || actor.role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::Forbidden("Forbidden".to_string()))
    }
}

/// Builds the PATCH body from the fields that were sent.
pub fn update_body(actor: &AuthUser, request: &UpdateUserRequest) -> Result<Map<String, Value>, AppError> {
    let mut body = Map::new();

    if let Some(role) = request.role.as_deref().filter(|r| !r.trim().is_empty()) {
        let role: Role = role
            .parse()
            .map_err(|_| AppError::BadRequest("Invalid role".to_string()))?;
        if actor.role != Role::Admin {
            return Err(AppError::Forbidden("Only admins can change roles".to_string()));
        }
        body.insert("role".into(), Value::String(role.as_str().to_string()));
    }

    let fields = [
        ("name", &request.name),
        ("email", &request.email),
        ("roll_number", &request.roll_no),
        ("specialization", &request.specialization),
    ];
    for (column, value) in fields {
        if let Some(value) = value {
            body.insert(column.into(), Value::String(value.clone()));
        }
    }

    if body.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }
    Ok(body)
}

pub struct UserService {
    db: SupabaseClient,
}

impl UserService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
        }
    }

    pub async fn list_users(&self) -> Result<Vec<PublicUser>, AppError> {
        let path = format!("/rest/v1/users?select={}&order=id.asc", PUBLIC_USER_COLUMNS);
        Ok(self.db.select(&path).await?)
    }

    pub async fn get_user(&self, user_id: i64) -> Result<PublicUser, AppError> {
        debug!("Fetching user {}", user_id);
        let path = format!("/rest/v1/users?id=eq.{}&select={}", user_id, PUBLIC_USER_COLUMNS);
        self.db
            .select_one(&path)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    #[instrument(skip(self, request), fields(actor = actor.id))]
    pub async fn update_user(
        &self,
        actor: &AuthUser,
        user_id: i64,
        request: UpdateUserRequest,
    ) -> Result<PublicUser, AppError> {
        ensure_self_or_admin(actor, user_id)?;
        let body = update_body(actor, &request)?;

        let path = format!("/rest/v1/users?id=eq.{}&select={}", user_id, PUBLIC_USER_COLUMNS);
        let rows: Vec<PublicUser> = self.db.update(&path, Value::Object(body)).await?;

        let user = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        info!("User {} updated", user_id);
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn set_time_per_patient(&self, doctor_id: i64, minutes: Option<i32>) -> Result<PublicUser, AppError> {
        let minutes = minutes
            .filter(|m| *m > 0)
            .ok_or_else(|| AppError::BadRequest("Time per patient must be greater than 0".to_string()))?;

        let path = format!(
            "/rest/v1/users?id=eq.{}&role=eq.doctor&select={}",
            doctor_id, PUBLIC_USER_COLUMNS
        );
        let rows: Vec<PublicUser> = self
            .db
            .update(&path, serde_json::json!({ "time_per_patient": minutes }))
            .await?;

        let doctor = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Doctor not found".to_string()))?;
        info!("Doctor {} now takes {} minutes per patient", doctor_id, minutes);
        Ok(doctor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn actor(id: i64, role: Role) -> AuthUser {
        AuthUser { id, role }
    }

    #[test]
    fn test_self_or_admin() {
        assert!(ensure_self_or_admin(&actor(3, Role::Student), 3).is_ok());
        assert!(ensure_self_or_admin(&actor(1, Role::Admin), 3).is_ok());
        assert_matches!(
            ensure_self_or_admin(&actor(4, Role::Doctor), 3),
            Err(AppError::Forbidden(_))
        );
    }

    #[test]
    fn test_only_admin_changes_role() {
        let request = UpdateUserRequest {
            role: Some("admin".into()),
            ..Default::default()
        };
        assert_matches!(
            update_body(&actor(3, Role::Student), &request),
            Err(AppError::Forbidden(_))
        );

        let body = update_body(&actor(1, Role::Admin), &request).unwrap();
        assert_eq!(body["role"], "admin");
    }

    #[test]
    fn test_update_body_maps_roll_number() {
        let request = UpdateUserRequest {
            name: Some("Asha K".into()),
            roll_no: Some("CS-21-044".into()),
            ..Default::default()
        };
        let body = update_body(&actor(3, Role::Student), &request).unwrap();
        assert_eq!(body["roll_number"], "CS-21-044");
        assert_eq!(body["name"], "Asha K");
        assert!(!body.contains_key("role"));
    }
}
