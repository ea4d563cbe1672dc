//! Schema CLI for the users database.
//!
//! Reads `DATABASE_URL`; e.g. `cargo run -p migration -- status` or `-- down -n 1`.
//! The API applies pending migrations itself at startup unless `RUN_MIGRATIONS=false`.

use migration::Migrator;
use sea_orm_migration::cli;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
