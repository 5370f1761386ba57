use crate::error::PersistenceError;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;

// Re-export the pool for use in other parts of the core crate
pub use sqlx::SqlitePool as DbPool;

/// Schema version the embedded migrations bring a database up to.
pub const SCHEMA_VERSION: i64 = 2;

/// Opens (creating if needed) the SQLite database and applies any migrations
/// the file has not seen yet.
///
/// Migrations only ever create missing tables, so opening an older database
/// never touches the records it already holds.
///
/// # Arguments
///
/// * `db_path` - The path to the SQLite database file.
pub async fn establish_connection(db_path: &str) -> Result<SqlitePool, PersistenceError> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    if !Path::new(db_path).exists() {
        tokio::fs::File::create(db_path).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&format!("sqlite://{}", db_path))
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Highest migration version applied to this database.
pub async fn schema_version(pool: &DbPool) -> Result<i64, PersistenceError> {
    let version: Option<i64> =
        sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations WHERE success = TRUE")
            .fetch_one(pool)
            .await?;
    Ok(version.unwrap_or(0))
}
