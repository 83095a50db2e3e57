//! Shared DuckDB connection handle.
//!
//! [`DuckDbBackend`] owns one [`Connection`] behind a mutex so the store and
//! the executor can share it; the executor holds the lock for a whole unit of
//! work and hands the connection to the store explicitly.

use crate::error::{DbError, DbResult};
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Prefix accepted in front of a database path in connection URLs.
pub const URL_SCHEME: &str = "duckdb://";

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self::from_connection(conn))
    }

    /// Create from a path or `duckdb://` URL (handles the `:memory:` special case)
    pub fn new(location: &str) -> DbResult<Self> {
        if is_in_memory(location) {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(strip_scheme(location)))
        }
    }

    /// Wrap an already opened connection
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Lock the connection for exclusive use
    pub fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }
}

/// True when `location` names a transient in-memory database.
pub fn is_in_memory(location: &str) -> bool {
    let path = strip_scheme(location);
    path.is_empty() || path == ":memory:"
}

fn strip_scheme(location: &str) -> &str {
    location.strip_prefix(URL_SCHEME).unwrap_or(location)
}

/// Execute `body` within a `BEGIN` / `COMMIT` transaction on `conn`, rolling
/// back on error.
pub fn with_transaction<F, T, E>(conn: &Connection, body: F) -> Result<T, E>
where
    F: FnOnce(&Connection) -> Result<T, E>,
    E: From<DbError>,
{
    conn.execute_batch("BEGIN TRANSACTION")
        .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;

    let result = body(conn);

    match &result {
        Ok(_) => {
            if let Err(commit_err) = conn.execute_batch("COMMIT") {
                let _ = conn.execute_batch("ROLLBACK");
                return Err(DbError::TransactionError(format!("COMMIT failed: {commit_err}")).into());
            }
        }
        Err(_) => {
            if let Err(rollback_err) = conn.execute_batch("ROLLBACK") {
                log::warn!("ROLLBACK failed: {rollback_err}");
            }
        }
    }
    result
}

#[cfg(test)]
#[path = "connection_test.rs"]
mod tests;
