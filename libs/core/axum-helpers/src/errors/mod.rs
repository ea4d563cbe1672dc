pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Body of every error response.
///
/// ```json
/// {
///   "code": 1101,
///   "error": "DUPLICATE_EMAIL",
///   "message": "Email already registered",
///   "details": null
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable identifier, see [`ErrorCode`]
    pub error: String,
    /// Human-readable message
    pub message: String,
    /// Structured details, e.g. per-field validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Error type for handlers and extractors, rendered as [`ErrorResponse`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Query extraction error: {0}")]
    QueryExtractorRejection(#[from] QueryRejection),

    #[error("Path extraction error: {0}")]
    PathExtractorRejection(#[from] PathRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    /// Semantic validation failure detected past the extractors.
    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    /// Client error with a specific code, e.g. a uniqueness conflict.
    #[error("Bad Request ({code}): {message}")]
    BadRequest { code: ErrorCode, message: String },

    #[error("Not Found: {0}")]
    NotFound(String),

    /// Logged in full; clients only see the generic message.
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    /// Logged in full; clients only see the generic message.
    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::JsonExtractorRejection(_)
            | AppError::QueryExtractorRejection(_)
            | AppError::PathExtractorRejection(_)
            | AppError::ValidationError(_)
            | AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::JsonExtractorRejection(_) => ErrorCode::InvalidJson,
            AppError::QueryExtractorRejection(_) => ErrorCode::InvalidQuery,
            AppError::PathExtractorRejection(_) => ErrorCode::InvalidPathParam,
            AppError::ValidationError(_) | AppError::Unprocessable(_) => ErrorCode::ValidationError,
            AppError::BadRequest { code, .. } => *code,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::InternalServerError(_) => ErrorCode::InternalError,
            AppError::ServiceUnavailable(_) => ErrorCode::ServiceUnavailable,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.error_code();

        let body = match self {
            AppError::JsonExtractorRejection(e) => {
                tracing::info!(error_code = code.code(), "JSON extraction error: {}", e.body_text());
                ErrorResponse::new(code, e.body_text())
            }
            AppError::QueryExtractorRejection(e) => {
                tracing::info!(error_code = code.code(), "Query extraction error: {}", e.body_text());
                ErrorResponse::new(code, e.body_text())
            }
            AppError::PathExtractorRejection(e) => {
                tracing::info!(error_code = code.code(), "Path extraction error: {}", e.body_text());
                ErrorResponse::new(code, e.body_text())
            }
            AppError::ValidationError(e) => {
                tracing::info!(error_code = code.code(), "Validation error: {}", e);
                ErrorResponse::new(code, code.default_message()).with_details(validation_details(&e))
            }
            AppError::Unprocessable(message) => {
                tracing::info!(error_code = code.code(), "Unprocessable: {}", message);
                ErrorResponse::new(code, message)
            }
            AppError::BadRequest { message, .. } => {
                tracing::info!(error_code = code.code(), "Bad request: {}", message);
                ErrorResponse::new(code, message)
            }
            AppError::NotFound(message) => {
                tracing::info!(error_code = code.code(), "Not found: {}", message);
                ErrorResponse::new(code, message)
            }
            AppError::InternalServerError(detail) => {
                tracing::error!(error_code = code.code(), "Internal server error: {}", detail);
                ErrorResponse::new(code, code.default_message())
            }
            AppError::ServiceUnavailable(detail) => {
                tracing::warn!(error_code = code.code(), "Service unavailable: {}", detail);
                ErrorResponse::new(code, code.default_message())
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Flatten validator errors into `{field: [{code, message, params}]}`.
///
/// Nested structs and lists are reported under their field name as well.
pub fn validation_details(errors: &ValidationErrors) -> Value {
    let fields = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let entries: Vec<Value> = errs
                .iter()
                .map(|err| {
                    json!({
                        "code": err.code,
                        "message": err.message,
                        "params": err.params,
                    })
                })
                .collect();
            (field.to_string(), Value::Array(entries))
        })
        .collect::<serde_json::Map<_, _>>();

    Value::Object(fields)
}

/// Build an error response without going through [`AppError`].
///
/// ```rust,ignore
/// use axum_helpers::errors::{error_response, ErrorCode};
/// use axum::http::StatusCode;
///
/// let response = error_response(
///     StatusCode::NOT_FOUND,
///     "No route for /nope",
///     ErrorCode::NotFound,
/// );
/// ```
pub fn error_response(status: StatusCode, message: impl Into<String>, code: ErrorCode) -> Response {
    (status, Json(ErrorResponse::new(code, message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use validator::Validate;

    async fn body_of(response: Response) -> ErrorResponse {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[derive(Validate)]
    struct Signup {
        #[validate(length(min = 1, max = 5))]
        name: String,
    }

    #[tokio::test]
    async fn test_validation_error_has_field_details() {
        let errors = Signup {
            name: "far too long".into(),
        }
        .validate()
        .unwrap_err();

        let response = AppError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_of(response).await;
        assert_eq!(body.error, "VALIDATION_ERROR");
        assert_eq!(body.code, 1001);
        let details = body.details.unwrap();
        assert_eq!(details["name"][0]["code"], "length");
    }

    #[tokio::test]
    async fn test_bad_request_keeps_code_and_message() {
        let response = AppError::BadRequest {
            code: ErrorCode::DuplicateEmail,
            message: "Email already registered".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_of(response).await;
        assert_eq!(body.error, "DUPLICATE_EMAIL");
        assert_eq!(body.message, "Email already registered");
        assert!(body.details.is_none());
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response =
            AppError::InternalServerError("pool exploded: password=hunter2".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_of(response).await;
        assert_eq!(body.error, "INTERNAL_ERROR");
        assert_eq!(body.message, ErrorCode::InternalError.default_message());
    }

    #[tokio::test]
    async fn test_service_unavailable_hides_detail() {
        let response = AppError::ServiceUnavailable(
            "Connection Error: connect to 10.0.3.7:5432 user=svc_users failed".into(),
        )
        .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_of(response).await;
        assert_eq!(body.error, "SERVICE_UNAVAILABLE");
        assert_eq!(body.message, ErrorCode::ServiceUnavailable.default_message());
        assert!(!body.message.contains("10.0.3.7"));
        assert!(body.details.is_none());
    }

    #[tokio::test]
    async fn test_error_response_helper() {
        let response = error_response(StatusCode::NOT_FOUND, "gone", ErrorCode::NotFound);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_of(response).await;
        assert_eq!(body.code, ErrorCode::NotFound.code());
        assert_eq!(body.message, "gone");
    }
}
