//! SQL storage error types.

use kc_storage::StorageError;
use sqlx::Error as SqlxError;

/// `PostgreSQL` SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Converts a `SQLx` error to a storage error.
#[allow(clippy::needless_pass_by_value)]
pub fn from_sqlx_error(err: SqlxError) -> StorageError {
    match err {
        SqlxError::RowNotFound => StorageError::Internal("Row not found".to_string()),
        SqlxError::Database(db_err) => {
            if db_err.code().is_some_and(|c| c == UNIQUE_VIOLATION) {
                StorageError::duplicate("Role", "name", db_err.message())
            } else {
                StorageError::Query(db_err.to_string())
            }
        }
        SqlxError::PoolTimedOut => StorageError::Connection("Connection pool timeout".to_string()),
        SqlxError::PoolClosed => StorageError::Connection("Connection pool closed".to_string()),
        SqlxError::Io(e) => StorageError::Connection(e.to_string()),
        SqlxError::Tls(e) => StorageError::Connection(e.to_string()),
        _ => StorageError::Internal(err.to_string()),
    }
}

/// Converts a `SQLx` error raised while writing a role, mapping unique
/// constraint violations to `StorageError::Duplicate`.
pub fn from_write_error(err: SqlxError, role_name: &str) -> StorageError {
    if is_unique_violation(&err) {
        return StorageError::duplicate("Role", "name", role_name);
    }
    from_sqlx_error(err)
}

/// Converts a `SQLx` error raised by `begin`/`commit`.
pub fn from_transaction_error(err: SqlxError) -> StorageError {
    match from_sqlx_error(err) {
        StorageError::Internal(msg) | StorageError::Query(msg) => StorageError::Transaction(msg),
        other => other,
    }
}

fn is_unique_violation(err: &SqlxError) -> bool {
    if let SqlxError::Database(db_err) = err {
        return db_err.code().is_some_and(|c| c == UNIQUE_VIOLATION);
    }
    false
}
