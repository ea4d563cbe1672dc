use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use super::PostgresConfig;
use crate::common::{DatabaseError, DatabaseResult, RetryConfig, retry_with_backoff};

pub async fn connect(config: &PostgresConfig) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(config.clone().into_connect_options()).await?;
    info!(
        url = %config.redacted_url(),
        max_connections = config.max_connections,
        "connected to PostgreSQL"
    );
    Ok(db)
}

/// Connect, retrying with backoff while the server is not reachable yet
/// (typical when the app and database start together).
pub async fn connect_with_retry(
    config: &PostgresConfig,
    retry: RetryConfig,
) -> DatabaseResult<DatabaseConnection> {
    retry_with_backoff(|| connect(config), &retry)
        .await
        .map_err(|e| DatabaseError::ConnectionFailed {
            attempts: retry.attempts(),
            message: e.to_string(),
        })
}

/// Apply all pending migrations of `M`.
pub async fn run_migrations<M: MigratorTrait>(db: &DatabaseConnection) -> DatabaseResult<()> {
    let pending = M::get_pending_migrations(db)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?
        .len();

    if pending == 0 {
        info!("database schema is up to date");
        return Ok(());
    }

    info!(pending, "applying database migrations");
    M::up(db, None)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;
    info!("migrations applied");
    Ok(())
}
