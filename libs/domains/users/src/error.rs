use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, ErrorCode};
use thiserror::Error;

use crate::password::PasswordError;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(i64),

    #[error("Email '{0}' already registered")]
    DuplicateEmail(String),

    #[error("Username '{0}' already taken")]
    DuplicateUsername(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<PasswordError> for UserError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Empty => UserError::Validation(err.to_string()),
            other => UserError::PasswordHash(other.to_string()),
        }
    }
}

/// Values are kept out of client-facing messages; they only reach the logs.
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => AppError::NotFound("User not found".to_string()),
            UserError::DuplicateEmail(_) => AppError::BadRequest {
                code: ErrorCode::DuplicateEmail,
                message: ErrorCode::DuplicateEmail.default_message().to_string(),
            },
            UserError::DuplicateUsername(_) => AppError::BadRequest {
                code: ErrorCode::DuplicateUsername,
                message: ErrorCode::DuplicateUsername.default_message().to_string(),
            },
            UserError::Validation(msg) => AppError::Unprocessable(msg),
            UserError::Unavailable(msg) => AppError::ServiceUnavailable(msg),
            UserError::PasswordHash(msg) | UserError::Internal(msg) => {
                AppError::InternalServerError(msg)
            }
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
