//! Connection plumbing for the service's PostgreSQL store.
//!
//! # Features
//!
//! - `postgres` (default): SeaORM connector, migrations runner and health check
//! - `config`: `core_config::FromEnv` for [`postgres::PostgresConfig`]
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::{postgres, RetryConfig};
//!
//! let config = postgres::PostgresConfig::from_env()?;
//! let db = postgres::connect_with_retry(&config, RetryConfig::default()).await?;
//! postgres::run_migrations::<migration::Migrator>(&db).await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult, RetryConfig};
