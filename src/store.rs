//! SQLite pool construction and schema DDL for owners and accounts.

use crate::config::DataSource;
use crate::error::{AppError, ConfigError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS owners (
        id BLOB PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        birthdate TEXT NOT NULL,
        email TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id BLOB PRIMARY KEY NOT NULL,
        iban TEXT NOT NULL,
        balance REAL NOT NULL DEFAULT 0,
        owner_id BLOB NOT NULL REFERENCES owners (id) ON DELETE RESTRICT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_accounts_owner_id ON accounts (owner_id)",
];

/// Open a pool for `source`. File databases (and their directory) are created when missing.
pub async fn connect(source: &DataSource) -> Result<SqlitePool, AppError> {
    match source {
        DataSource::Memory => connect_in_memory().await,
        DataSource::File(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir).map_err(|source| ConfigError::DataDir {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .foreign_keys(true);
            tracing::info!(path = %path.display(), "opening sqlite database");
            Ok(SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?)
        }
    }
}

/// Private in-memory database. One connection that never expires, so the data lives as long
/// as the pool.
pub async fn connect_in_memory() -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    Ok(SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?)
}

/// Create tables and index if they do not exist.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), AppError> {
    for ddl in SCHEMA {
        sqlx::query(ddl).execute(pool).await?;
    }
    tracing::debug!("schema ensured");
    Ok(())
}

/// Drop both tables (children first).
pub async fn drop_schema(pool: &SqlitePool) -> Result<(), AppError> {
    for ddl in ["DROP TABLE IF EXISTS accounts", "DROP TABLE IF EXISTS owners"] {
        sqlx::query(ddl).execute(pool).await?;
    }
    tracing::debug!("schema dropped");
    Ok(())
}

/// True when no owner row exists.
pub async fn is_empty(pool: &SqlitePool) -> Result<bool, AppError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM owners LIMIT 1")
        .fetch_optional(pool)
        .await?;
    Ok(row.is_none())
}
