use axum::{Router, routing::get};
use axum_helpers::server::{create_router, health_router};

use crate::openapi::ApiDoc;
use crate::state::AppState;

pub mod health;
pub mod users;

/// Domain routes with their state applied.
pub fn routes(state: &AppState) -> Router {
    Router::new().nest("/users", users::router(state))
}

/// `/ready`, checking the database.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

/// The complete application: domain routes, docs, fallbacks and probes.
pub fn app(state: &AppState) -> std::io::Result<Router> {
    let apis = routes(state)
        .merge(health_router())
        .merge(ready_router(state.clone()));

    create_router::<ApiDoc>(apis, &state.config.cors)
}
