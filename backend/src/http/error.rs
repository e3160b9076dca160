//! HTTP error handling.
//!
//! Error bodies are a single plain-text message. Storage and serialization
//! faults are logged here with their full context and rendered as a generic
//! `Internal Server Error`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::db::repository::RepositoryError;
use crate::validation::ValidationError;

const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Malformed or invalid input (400)
    BadRequest(String),
    /// Resource not found (404)
    NotFound(String),
    /// Path exists but the verb is not routed (405)
    MethodNotAllowed,
    /// Internal server error (500); the message is logged, never returned
    Internal(String),
    /// Repository error, classified by the storage layer
    Repository(RepositoryError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Repository(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            AppError::Repository(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            AppError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            AppError::BadRequest(msg) | AppError::NotFound(msg) => msg,
            AppError::MethodNotAllowed => "Method Not Allowed".to_string(),
            AppError::Internal(msg) => {
                error!(error = %msg, "internal error");
                INTERNAL_SERVER_ERROR.to_string()
            }
            AppError::Repository(e) => {
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    error!(error = %e, "repository operation failed");
                    INTERNAL_SERVER_ERROR.to_string()
                } else {
                    e.message().to_string()
                }
            }
        };

        (status, body).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::ErrorContext;

    #[test]
    fn test_repository_not_found_maps_to_404() {
        let err = AppError::from(RepositoryError::not_found("Question not found"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_repository_validation_maps_to_400() {
        let err = AppError::from(RepositoryError::validation("text cannot be empty"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_other_repository_errors_map_to_500() {
        for err in [
            RepositoryError::query("syntax error"),
            RepositoryError::connection("refused"),
            RepositoryError::timeout("pool exhausted"),
            RepositoryError::internal_with_context("boom", ErrorContext::new("create_question")),
        ] {
            assert_eq!(
                AppError::from(err).status_code(),
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }
    }

    #[test]
    fn test_validation_error_maps_to_400() {
        let err = AppError::from(ValidationError::Blank { field: "text" });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "text cannot be empty"));
    }
}
