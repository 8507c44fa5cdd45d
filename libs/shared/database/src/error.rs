use serde::Deserialize;
use thiserror::Error;

use shared_models::error::AppError;

/// Postgres SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
}

impl DatabaseError {
    /// Classify a non-success PostgREST response.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<PostgrestErrorBody>(body).ok();
        let code = parsed.as_ref().and_then(|b| b.code.clone());
        let message = parsed
            .and_then(|b| b.message)
            .unwrap_or_else(|| body.to_string());

        if status == 409 || code.as_deref() == Some(UNIQUE_VIOLATION) {
            return DatabaseError::Conflict(message);
        }

        match status {
            401 | 403 => DatabaseError::Auth(message),
            404 => DatabaseError::NotFound(message),
            _ => DatabaseError::Api { status, message },
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, DatabaseError::Conflict(_))
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_unique_violation_is_conflict() {
        let body = r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#;
        assert_matches!(DatabaseError::from_response(409, body), DatabaseError::Conflict(_));
        assert_matches!(DatabaseError::from_response(400, body), DatabaseError::Conflict(_));
    }

    #[test]
    fn test_other_statuses() {
        assert_matches!(DatabaseError::from_response(401, "nope"), DatabaseError::Auth(_));
        assert_matches!(
            DatabaseError::from_response(500, "boom"),
            DatabaseError::Api { status: 500, .. }
        );
    }
}
