use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::{method_not_allowed, not_found};
use crate::http::create_cors_layer;
use axum::{Router, ServiceExt, extract::Request};
use core_config::{CorsConfig, ServerConfig};
use std::future::{Future, IntoFuture};
use std::io;
use tower::Layer;
use tower_http::compression::CompressionLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, warn};
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

/// Wrap domain routes with docs, fallbacks and cross-cutting layers.
///
/// - Swagger UI at `/docs`, ReDoc at `/redoc`, document at `/api-docs/openapi.json`
/// - unknown paths and wrong methods answer in the standard error body
/// - request/response tracing, CORS, response compression
///
/// `apis` must already have its state applied and include the health probes,
/// so they are traced and carry CORS headers like every other route.
pub fn create_router<T>(apis: Router, cors: &CorsConfig) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    let cors_layer = create_cors_layer(cors).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid CORS_ALLOWED_ORIGINS value: {e}"),
        )
    })?;

    if cors.allows_any_origin() {
        warn!("CORS allows any origin; set CORS_ALLOWED_ORIGINS outside development");
    } else {
        info!(origins = ?cors.allowed_origins, "CORS restricted");
    }

    let router = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", T::openapi()))
        .merge(Redoc::with_url("/redoc", T::openapi()))
        .merge(apis)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer)
        .layer(CompressionLayer::new());

    Ok(router)
}

/// Strip a trailing slash before routing, so `/users/` reaches `/users`.
///
/// Must wrap the whole router; as a route layer it would run after matching.
pub fn normalize_trailing_slash(router: Router) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router)
}

/// Serve until SIGINT/SIGTERM, then drain and run `cleanup`.
///
/// In-flight requests get `server_config.shutdown_timeout` to finish; `cleanup`
/// (closing the pool, flushing) runs after the listener stops and gets the
/// same budget.
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let shutdown_timeout = server_config.shutdown_timeout;
    let coordinator = ShutdownCoordinator::new();

    let signals = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.wait_for_signal().await })
    };

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let app = normalize_trailing_slash(router);
    let server = axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown({
            let coordinator = coordinator.clone();
            async move { coordinator.notified().await }
        })
        .into_future();

    let drain_deadline = async {
        coordinator.notified().await;
        tokio::time::sleep(shutdown_timeout).await;
    };

    let serve_result = tokio::select! {
        result = server => result.inspect_err(|e| tracing::error!("Server error: {:?}", e)),
        _ = drain_deadline => {
            warn!(?shutdown_timeout, "in-flight requests did not finish in time");
            Ok(())
        }
    };

    signals.abort();

    info!(?shutdown_timeout, "running cleanup");
    match tokio::time::timeout(shutdown_timeout, cleanup).await {
        Ok(()) => info!("cleanup completed"),
        Err(_) => warn!(?shutdown_timeout, "cleanup exceeded timeout, forcing shutdown"),
    }

    serve_result
}
