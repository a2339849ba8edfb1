use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use dsa_core::ProgressError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Quiz is on cooldown until {available_at}")]
    Cooldown {
        available_at: DateTime<Utc>,
        remaining_seconds: i64,
    },
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Jwt(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Cooldown { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Map a failed insert/update to `Conflict` when it hit a unique constraint.
    pub fn from_write(err: sqlx::Error, conflict_message: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Conflict(conflict_message.to_string())
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                Self::Validation("Referenced record does not exist".to_string())
            }
            _ => Self::Database(err),
        }
    }
}

impl From<ProgressError> for ApiError {
    fn from(err: ProgressError) -> Self {
        match err {
            ProgressError::NodeLocked(_) => Self::Forbidden(err.to_string()),
            ProgressError::UnknownSubtopic { .. } => Self::Validation(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            // Never leak internals to the client
            Self::Database(e) => {
                tracing::error!(error = %e, "database error");
                json!({ "error": "Internal server error" })
            }
            Self::Jwt(e) => {
                tracing::error!(error = %e, "jwt error");
                json!({ "error": "Internal server error" })
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                json!({ "error": "Internal server error" })
            }
            Self::Cooldown {
                available_at,
                remaining_seconds,
            } => json!({
                "error": self.to_string(),
                "availableAt": available_at,
                "remainingSeconds": remaining_seconds,
            }),
            Self::Auth(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::Conflict(msg) => json!({ "error": msg }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should be readable")
            .to_bytes();
        (status, serde_json::from_slice(&bytes).expect("body should be JSON"))
    }

    #[tokio::test]
    async fn test_client_errors_carry_message() {
        let (status, body) = body_json(ApiError::NotFound("Roadmap not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Roadmap not found");

        let (status, _) = body_json(ApiError::Validation("bad".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = body_json(ApiError::Auth("Not authenticated".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = body_json(ApiError::Forbidden("admins only".into())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_internal_errors_are_masked() {
        let (status, body) = body_json(ApiError::Database(sqlx::Error::RowNotFound)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");

        let (_, body) = body_json(ApiError::Internal("secret detail".into())).await;
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_cooldown_reports_availability() {
        let available_at = Utc::now();
        let (status, body) = body_json(ApiError::Cooldown {
            available_at,
            remaining_seconds: 120,
        })
        .await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["remainingSeconds"], 120);
        assert!(body["availableAt"].is_string());
    }

    #[test]
    fn test_progress_errors_map_to_client_errors() {
        let locked: ApiError = ProgressError::NodeLocked("week-2".into()).into();
        assert_eq!(locked.status_code(), StatusCode::FORBIDDEN);

        let unknown: ApiError = ProgressError::UnknownSubtopic {
            node: "week-1".into(),
            subtopic: "nope".into(),
        }
        .into();
        assert_eq!(unknown.status_code(), StatusCode::BAD_REQUEST);
    }
}
