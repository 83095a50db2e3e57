//! Error types for tm-db

use thiserror::Error;
use tm_core::MigrateError;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Primary key / unique constraint violation (D003)
    #[error("[D003] Constraint violated: {0}")]
    ConstraintViolation(String),

    /// Transaction management error (D004)
    #[error("[D004] Transaction failed: {0}")]
    TransactionError(String),

    /// Mutex poisoned (D005)
    #[error("[D005] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error does not expose structured variants for constraint
        // failures, so classify by message.
        let msg = err.to_string();
        if msg.contains("Constraint Error")
            || msg.contains("Duplicate key")
            || msg.contains("violates primary key constraint")
        {
            DbError::ConstraintViolation(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}

impl From<DbError> for MigrateError {
    fn from(err: DbError) -> Self {
        MigrateError::ledger(err)
    }
}
