//! Helpers for picking apart SQLite constraint failures.

use sqlx::Error as DbError;

/// Return true if the given error is a `UNIQUE` constraint violation.
pub fn is_unique_violation(err: &DbError) -> bool {
    match err {
        DbError::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
