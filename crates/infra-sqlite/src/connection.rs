// SQLite Connection Pool Setup

use crate::error::map_sqlx_error;
use fleetsure_core::error::{AppError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

const MAX_CONNECTIONS: u32 = 10;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Create SQLite connection pool with WAL mode and foreign keys on every connection
///
/// Accepts `sqlite:` URLs, `:memory:` and bare file paths. Any other
/// `scheme://` is a configuration error rather than a file name.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    if database_url.contains("://") && !database_url.starts_with("sqlite:") {
        return Err(AppError::Config(format!(
            "Unsupported database url {}: only sqlite is supported",
            database_url
        )));
    }

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| AppError::Config(format!("Invalid database url {}: {}", database_url, e)))?
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT)
        .foreign_keys(true)
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await
        .map_err(map_sqlx_error)
}
