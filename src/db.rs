//! Database pool and schema migrations.
//!
//! Migrations are embedded at compile time and applied before the API starts
//! serving requests; startup aborts when they fail.

use rocket_db_pools::sqlx::{self, PgPool, migrate::Migrator};
use rocket_db_pools::Database;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Database)]
#[database("directory_db")]
pub struct DirectoryDb(sqlx::PgPool);

/// Run pending migrations. Already-applied migrations are skipped.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    log::info!("checking database migration state");
    MIGRATOR.run(pool).await?;
    log::info!("database migrations up to date");
    Ok(())
}
