//! Error codes carried in every error body.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::DuplicateEmail;
//! assert_eq!(code.as_str(), "DUPLICATE_EMAIL");
//! assert_eq!(code.code(), 1101);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Machine-readable error identifiers.
///
/// Integer ranges: 1000s request shape, 1100s conflicts with stored state,
/// 2000s server side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Field-level validation failed
    ValidationError,
    /// Request body is not valid JSON for the expected shape
    InvalidJson,
    /// Query string could not be parsed
    InvalidQuery,
    /// Path parameter could not be parsed
    InvalidPathParam,
    NotFound,
    MethodNotAllowed,

    DuplicateEmail,
    DuplicateUsername,

    InternalError,
    /// Storage unreachable or too slow
    ServiceUnavailable,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidJson => "INVALID_JSON",
            Self::InvalidQuery => "INVALID_QUERY",
            Self::InvalidPathParam => "INVALID_PATH_PARAM",
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::DuplicateEmail => "DUPLICATE_EMAIL",
            Self::DuplicateUsername => "DUPLICATE_USERNAME",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }

    /// Integer code for logs and dashboards.
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidJson => 1002,
            Self::InvalidQuery => 1003,
            Self::InvalidPathParam => 1004,
            Self::NotFound => 1005,
            Self::MethodNotAllowed => 1006,

            Self::DuplicateEmail => 1101,
            Self::DuplicateUsername => 1102,

            Self::InternalError => 2001,
            Self::ServiceUnavailable => 2002,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidJson => "Invalid JSON body",
            Self::InvalidQuery => "Invalid query parameters",
            Self::InvalidPathParam => "Invalid path parameter",
            Self::NotFound => "Resource not found",
            Self::MethodNotAllowed => "Method not allowed for this resource",
            Self::DuplicateEmail => "Email already registered",
            Self::DuplicateUsername => "Username already taken",
            Self::InternalError => "An internal server error occurred",
            Self::ServiceUnavailable => "Service is temporarily unavailable",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
