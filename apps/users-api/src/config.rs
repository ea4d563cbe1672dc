use core_config::{CorsConfig, FromEnv, ServerConfig, env_flag_or, env_parse_or};
use database::postgres::PostgresConfig;
use std::time::Duration;

pub use core_config::Environment;

const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 5_000;

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub database: PostgresConfig,
    pub cors: CorsConfig,
    /// Upper bound for a single repository call
    pub storage_timeout: Duration,
    /// Apply pending migrations before serving
    pub run_migrations: bool,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?; // Required - DATABASE_URL must be set
        let server = ServerConfig::from_env()?;
        let cors = CorsConfig::from_env()?;
        let storage_timeout =
            Duration::from_millis(env_parse_or("STORAGE_TIMEOUT_MS", DEFAULT_STORAGE_TIMEOUT_MS)?);
        let run_migrations = env_flag_or("RUN_MIGRATIONS", true)?;

        Ok(Self {
            server,
            database,
            cors,
            storage_timeout,
            run_migrations,
            environment,
        })
    }
}
