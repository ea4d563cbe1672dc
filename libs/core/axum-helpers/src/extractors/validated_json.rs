use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body extractor that also runs `validator::Validate`.
///
/// Malformed JSON and missing or mistyped fields reject with `INVALID_JSON`;
/// rule violations reject with `VALIDATION_ERROR` and per-field details.
/// Both are 422.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct CreateUser {
///     #[validate(length(min = 1, max = 50))]
///     username: String,
///     #[validate(email)]
///     email: String,
/// }
///
/// async fn create_user(ValidatedJson(input): ValidatedJson<CreateUser>) -> String {
///     input.username
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{self, StatusCode},
        routing::post,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 3))]
        name: String,
    }

    async fn echo(ValidatedJson(p): ValidatedJson<Payload>) -> String {
        p.name
    }

    async fn send(body: &'static str, content_type: Option<&str>) -> StatusCode {
        let mut request = http::Request::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            request = request.header("content-type", ct);
        }
        Router::new()
            .route("/", post(echo))
            .oneshot(request.body(Body::from(body)).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_valid_payload_passes() {
        assert_eq!(send(r#"{"name":"alice"}"#, Some("application/json")).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rule_violation_is_422() {
        assert_eq!(
            send(r#"{"name":"al"}"#, Some("application/json")).await,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn test_malformed_json_is_422() {
        assert_eq!(
            send(r#"{"name":"#, Some("application/json")).await,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            send(r#"{"nom":"alice"}"#, Some("application/json")).await,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn test_missing_content_type_is_422() {
        assert_eq!(send(r#"{"name":"alice"}"#, None).await, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
