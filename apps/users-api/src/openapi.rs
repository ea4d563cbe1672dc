use axum_helpers::ErrorResponse;
use utoipa::OpenApi;

/// Root OpenAPI document served at `/api-docs/openapi.json`
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Users API",
        description = "Create, read, update, delete and list user records"
    ),
    nest(
        (path = "/users", api = domain_users::ApiDoc)
    ),
    components(schemas(ErrorResponse))
)]
pub struct ApiDoc;
