//! Runs migration scripts against DuckDB.

use crate::connection::{with_transaction, DuckDbBackend};
use duckdb::Connection;
use std::sync::Arc;
use tm_core::{Executor, MigrateError, MigrateResult, Migration, Store};

/// Applies and reverts migrations on a shared DuckDB connection.
///
/// With `transaction: true` (the default option) the script and the ledger
/// update share one `BEGIN`/`COMMIT`, so a failure anywhere leaves neither a
/// partial schema change nor a ledger entry. With `transaction: false` the
/// script's statements commit as they run and the ledger is updated afterwards.
pub struct DuckDbExecutor {
    backend: Arc<DuckDbBackend>,
}

impl DuckDbExecutor {
    pub fn new(backend: Arc<DuckDbBackend>) -> Self {
        Self { backend }
    }

    fn run<F>(&self, migration: &Migration, script: &str, record: F) -> MigrateResult<()>
    where
        F: FnOnce(&Connection) -> MigrateResult<()>,
    {
        let conn = self.backend.lock()?;

        if migration.options.transaction {
            with_transaction(&conn, |conn| {
                run_script(conn, migration, script)?;
                record(conn)
            })
        } else {
            log::warn!(
                "Migration {} runs outside a transaction; a failure may leave it partially applied",
                migration.version
            );
            run_script(&conn, migration, script)?;
            record(&conn)
        }
    }
}

impl<S> Executor<S> for DuckDbExecutor
where
    S: Store<Context = Connection> + ?Sized,
{
    fn up(&self, migration: &Migration, store: &S) -> MigrateResult<()> {
        let script = migration.up_script()?;
        self.run(migration, script, |conn| store.insert(migration, Some(conn)))
    }

    fn down(&self, migration: &Migration, store: &S) -> MigrateResult<()> {
        if !migration.reversible() {
            return Err(MigrateError::Irreversible {
                version: migration.version,
            });
        }
        let script = migration.down_script()?;
        self.run(migration, script, |conn| store.remove(migration, Some(conn)))
    }
}

fn run_script(conn: &Connection, migration: &Migration, script: &str) -> MigrateResult<()> {
    if script.trim().is_empty() {
        log::debug!("Migration {} has an empty script", migration.version);
        return Ok(());
    }

    conn.execute_batch(script)
        .map_err(|e| MigrateError::ScriptExecution {
            version: migration.version,
            message: e.to_string(),
        })
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
