//! Server assembly: documented router, health probes, graceful shutdown.

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{create_production_app, create_router, normalize_trailing_slash};
pub use health::{HealthCheckFuture, health_router, run_health_checks};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
