//! # Axum Helpers
//!
//! Shared HTTP plumbing for the service binaries.
//!
//! - **[`errors`]**: the JSON error body, error codes and [`AppError`]
//! - **[`extractors`]**: validating JSON/query extractors
//! - **[`http`]**: CORS
//! - **[`server`]**: router assembly with OpenAPI docs, health probes, graceful shutdown
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//!
//! let router = create_router::<ApiDoc>(api_routes.merge(health_router()), &cors)?;
//! create_production_app(router, &server_config, async move { db.close().await.ok(); }).await?;
//! ```

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use errors::{AppError, ErrorCode, ErrorResponse, error_response};
pub use extractors::{ValidatedJson, ValidatedQuery};
pub use http::create_cors_layer;
pub use server::{
    HealthCheckFuture, ShutdownCoordinator, create_production_app, create_router, health_router,
    run_health_checks, shutdown_signal,
};
