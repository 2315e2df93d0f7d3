// sqlx::Error -> AppError mapping
//
// The orphan rule forbids `impl From<sqlx::Error> for AppError` here, so every
// query goes through one of these helpers instead.

use fleetsure_core::error::AppError;

// SQLite result codes (extended where sqlx reports them): https://www.sqlite.org/rescode.html
const SQLITE_BUSY: &str = "5";
const SQLITE_LOCKED: &str = "6";
const SQLITE_LOCKED_SHAREDCACHE: &str = "262";
const SQLITE_BUSY_SNAPSHOT: &str = "517";
const SQLITE_CONSTRAINT_PRIMARYKEY: &str = "1555";
const SQLITE_CONSTRAINT_UNIQUE: &str = "2067";
const SQLITE_CONSTRAINT_FOREIGNKEY: &str = "787";

fn db_code(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
        _ => None,
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        db_code(err).as_deref(),
        Some(SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY)
    )
}

pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    db_code(err).as_deref() == Some(SQLITE_CONSTRAINT_FOREIGNKEY)
}

/// Another connection holds the write lock or our read snapshot went stale
pub(crate) fn is_write_contention(err: &sqlx::Error) -> bool {
    matches!(
        db_code(err).as_deref(),
        Some(SQLITE_BUSY | SQLITE_BUSY_SNAPSHOT | SQLITE_LOCKED | SQLITE_LOCKED_SHAREDCACHE)
    )
}

pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => {
                let kind = match code.as_ref() {
                    SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY => {
                        "Unique constraint violation"
                    }
                    SQLITE_CONSTRAINT_FOREIGNKEY => "Foreign key constraint violation",
                    SQLITE_BUSY | SQLITE_BUSY_SNAPSHOT => "Database locked",
                    _ => "Database error",
                };
                AppError::Database(format!("{}: {} ({})", kind, db_err.message(), code))
            }
            None => AppError::Database(format!("Database error: {}", db_err.message())),
        },
        sqlx::Error::ColumnNotFound(col) => {
            AppError::Database(format!("Column not found: {}", col))
        }
        _ => AppError::Database(err.to_string()),
    }
}

/// Like [`map_sqlx_error`], but lock contention on a guarded write surfaces as
/// a conflict the caller may retry.
pub(crate) fn map_write_error(err: sqlx::Error, what: &str) -> AppError {
    if is_write_contention(&err) {
        AppError::Conflict(format!("{} was modified concurrently", what))
    } else {
        map_sqlx_error(err)
    }
}

/// A stored value that no longer parses into its domain type
pub(crate) fn corrupt(column: &str, err: impl std::fmt::Display) -> AppError {
    AppError::Database(format!("Invalid value in column {}: {}", column, err))
}
