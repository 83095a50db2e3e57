//! Ledger of applied migrations kept in a DuckDB table.

use crate::connection::DuckDbBackend;
use crate::error::DbError;
use chrono::DateTime;
use duckdb::Connection;
use std::sync::Arc;
use tm_core::config::is_table_identifier;
use tm_core::{MigrateError, MigrateResult, Migration, Migrations, Source, Store, Version};

/// Default ledger table name.
pub const DEFAULT_LEDGER_TABLE: &str = "schema_migrations";

/// A [`Store`] backed by a DuckDB table.
///
/// The table (and its schema, when the name is qualified) is created on first
/// use:
///
/// ```sql
/// CREATE TABLE schema_migrations (
///     version     BIGINT PRIMARY KEY,
///     version_tag VARCHAR,
///     applied_at  TIMESTAMP NOT NULL DEFAULT current_timestamp
/// );
/// ```
pub struct DuckDbStore {
    backend: Arc<DuckDbBackend>,
    table: String,
}

impl DuckDbStore {
    /// Use the default `schema_migrations` table.
    pub fn new(backend: Arc<DuckDbBackend>) -> Self {
        Self {
            backend,
            table: DEFAULT_LEDGER_TABLE.to_string(),
        }
    }

    /// Use a custom, optionally schema-qualified, table name.
    pub fn with_table(backend: Arc<DuckDbBackend>, table: &str) -> MigrateResult<Self> {
        if !is_table_identifier(table) {
            return Err(MigrateError::ConfigInvalid {
                message: format!("invalid ledger table name '{table}'"),
            });
        }
        Ok(Self {
            backend,
            table: table.to_string(),
        })
    }

    /// Name of the ledger table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Run `body` on the executor's connection when one is supplied, otherwise
    /// on this store's own locked connection.
    fn with_conn<T>(
        &self,
        ctx: Option<&Connection>,
        body: impl FnOnce(&Connection) -> MigrateResult<T>,
    ) -> MigrateResult<T> {
        match ctx {
            Some(conn) => body(conn),
            None => {
                let conn = self.backend.lock()?;
                body(&conn)
            }
        }
    }

    fn ensure_ledger(&self, conn: &Connection) -> MigrateResult<()> {
        let (schema, name) = match self.table.split_once('.') {
            Some((schema, name)) => (Some(schema), name),
            None => (None, self.table.as_str()),
        };

        let mut ddl = String::new();
        if let Some(schema) = schema {
            ddl.push_str(&format!("CREATE SCHEMA IF NOT EXISTS {schema};\n"));
        }
        ddl.push_str(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                 version     BIGINT PRIMARY KEY,
                 version_tag VARCHAR,
                 applied_at  TIMESTAMP NOT NULL DEFAULT current_timestamp
             );
             CREATE INDEX IF NOT EXISTS {name}_applied_at ON {table} (applied_at);",
            table = self.table
        ));

        conn.execute_batch(&ddl).map_err(|e| {
            MigrateError::ledger(format!("failed to create ledger table {}: {e}", self.table))
        })
    }
}

impl Source for DuckDbStore {
    fn collect(&self) -> MigrateResult<Migrations> {
        self.with_conn(None, |conn| {
            self.ensure_ledger(conn)?;

            let sql = format!(
                "SELECT version, version_tag, epoch_ms(applied_at)
                 FROM {}
                 ORDER BY applied_at DESC, version DESC",
                self.table
            );
            let read_error =
                |e: duckdb::Error| MigrateError::ledger(format!("failed to read ledger: {e}"));

            let mut stmt = conn.prepare(&sql).map_err(read_error)?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(Migration {
                        version_tag: row.get::<_, Option<String>>(1)?,
                        applied_at: DateTime::from_timestamp_millis(row.get::<_, i64>(2)?),
                        ..Migration::with_version(Version::new(row.get::<_, i64>(0)?))
                    })
                })
                .map_err(read_error)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(read_error)?;

            Ok(rows.into())
        })
    }
}

impl Store for DuckDbStore {
    type Context = Connection;

    fn insert(&self, migration: &Migration, ctx: Option<&Connection>) -> MigrateResult<()> {
        self.with_conn(ctx, |conn| {
            self.ensure_ledger(conn)?;

            let sql = format!(
                "INSERT INTO {} (version, version_tag) VALUES (?, ?)",
                self.table
            );
            conn.execute(
                &sql,
                duckdb::params![
                    migration.version.as_i64(),
                    migration.version_tag.as_deref()
                ],
            )
            .map_err(|e| match DbError::from(e) {
                DbError::ConstraintViolation(_) => MigrateError::DuplicateVersion {
                    version: migration.version,
                },
                other => MigrateError::ledger(format!(
                    "failed to record version {}: {other}",
                    migration.version
                )),
            })?;

            log::debug!("Recorded version {} in {}", migration.version, self.table);
            Ok(())
        })
    }

    fn remove(&self, migration: &Migration, ctx: Option<&Connection>) -> MigrateResult<()> {
        self.with_conn(ctx, |conn| {
            self.ensure_ledger(conn)?;

            let sql = format!("DELETE FROM {} WHERE version = ?", self.table);
            let removed = conn
                .execute(&sql, duckdb::params![migration.version.as_i64()])
                .map_err(|e| {
                    MigrateError::ledger(format!(
                        "failed to remove version {}: {e}",
                        migration.version
                    ))
                })?;

            if removed == 0 {
                log::debug!("Version {} was not recorded", migration.version);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
