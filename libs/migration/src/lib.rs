pub use sea_orm_migration::prelude::*;

mod m20241129_000000_create_users;

pub use m20241129_000000_create_users::{UQ_USERS_EMAIL, UQ_USERS_USERNAME};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20241129_000000_create_users::Migration)]
    }
}
