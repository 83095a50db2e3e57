use super::*;
use crate::store::DuckDbStore;
use tm_core::{MigrationOptions, Migrations, Source, Version};

struct Fixture {
    backend: Arc<DuckDbBackend>,
    store: DuckDbStore,
    executor: DuckDbExecutor,
}

fn fixture() -> Fixture {
    let backend = Arc::new(DuckDbBackend::in_memory().unwrap());
    Fixture {
        store: DuckDbStore::new(Arc::clone(&backend)),
        executor: DuckDbExecutor::new(Arc::clone(&backend)),
        backend,
    }
}

fn migration(version: i64, up: &str, down: &str) -> Migration {
    Migration {
        path: format!("migrations/{version}_test"),
        up_sql: up.as_bytes().to_vec(),
        down_sql: down.as_bytes().to_vec(),
        ..Migration::with_version(version)
    }
}

fn users() -> Migration {
    migration(
        20170329154959,
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name VARCHAR);",
        "DROP TABLE users;",
    )
}

fn table_exists(backend: &DuckDbBackend, name: &str) -> bool {
    let conn = backend.lock().unwrap();
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = ?",
            duckdb::params![name],
            |row| row.get(0),
        )
        .unwrap();
    count > 0
}

fn recorded(store: &DuckDbStore, version: i64) -> bool {
    store
        .collect()
        .unwrap()
        .iter()
        .any(|m| m.version == Version::new(version))
}

/// A ledger that accepts reads but refuses every write.
struct RefusingStore;

impl Source for RefusingStore {
    fn collect(&self) -> MigrateResult<Migrations> {
        Ok(Migrations::new())
    }
}

impl Store for RefusingStore {
    type Context = Connection;

    fn insert(&self, _: &Migration, _: Option<&Connection>) -> MigrateResult<()> {
        Err(MigrateError::ledger("ledger is read-only"))
    }

    fn remove(&self, _: &Migration, _: Option<&Connection>) -> MigrateResult<()> {
        Err(MigrateError::ledger("ledger is read-only"))
    }
}

#[test]
fn up_runs_script_and_records_version() {
    let f = fixture();
    f.executor.up(&users(), &f.store).unwrap();

    assert!(table_exists(&f.backend, "users"));
    assert!(recorded(&f.store, 20170329154959));
}

#[test]
fn up_with_broken_script_changes_nothing() {
    let f = fixture();
    let broken = migration(
        20180920181906,
        "CREATE TABLE audit_log (id INTEGER);\nINSERT INTO table_that_does_not_exist VALUES (1);",
        "",
    );

    let err = f.executor.up(&broken, &f.store).unwrap_err();
    assert!(matches!(err, MigrateError::ScriptExecution { .. }));
    assert!(!table_exists(&f.backend, "audit_log"));
    assert!(!recorded(&f.store, 20180920181906));
}

#[test]
fn up_rolls_back_script_when_ledger_fails() {
    let f = fixture();

    let err = f.executor.up(&users(), &RefusingStore).unwrap_err();
    assert!(matches!(err, MigrateError::Ledger { .. }));
    assert!(!table_exists(&f.backend, "users"));
}

#[test]
fn up_twice_reports_duplicate_and_rolls_back() {
    let f = fixture();
    let m = migration(
        1,
        "CREATE TABLE IF NOT EXISTS counters (n INTEGER); INSERT INTO counters VALUES (1);",
        "DROP TABLE counters;",
    );

    f.executor.up(&m, &f.store).unwrap();
    let err = f.executor.up(&m, &f.store).unwrap_err();
    assert!(matches!(err, MigrateError::DuplicateVersion { .. }));

    let conn = f.backend.lock().unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM counters", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn down_runs_reverse_script_and_removes_record() {
    let f = fixture();
    let m = users();
    f.executor.up(&m, &f.store).unwrap();

    f.executor.down(&m, &f.store).unwrap();
    assert!(!table_exists(&f.backend, "users"));
    assert!(!recorded(&f.store, 20170329154959));
}

#[test]
fn down_irreversible_fails_without_touching_ledger() {
    let f = fixture();
    let m = migration(20170511172647, "CREATE TABLE notes (body VARCHAR);", "");
    f.executor.up(&m, &f.store).unwrap();

    let err = f.executor.down(&m, &f.store).unwrap_err();
    assert!(matches!(err, MigrateError::Irreversible { version } if version == m.version));
    assert!(recorded(&f.store, 20170511172647));
    assert!(table_exists(&f.backend, "notes"));
}

#[test]
fn down_with_broken_script_keeps_record() {
    let f = fixture();
    let m = migration(
        3,
        "CREATE TABLE temp_data (id INTEGER);",
        "DROP TABLE temp_data; DROP TABLE table_that_does_not_exist;",
    );
    f.executor.up(&m, &f.store).unwrap();

    let err = f.executor.down(&m, &f.store).unwrap_err();
    assert!(matches!(err, MigrateError::ScriptExecution { .. }));
    assert!(recorded(&f.store, 3));
    assert!(table_exists(&f.backend, "temp_data"));
}

#[test]
fn non_transactional_script_stays_applied_when_ledger_fails() {
    let f = fixture();
    let m = Migration {
        options: MigrationOptions { transaction: false },
        ..users()
    };

    let err = f.executor.up(&m, &RefusingStore).unwrap_err();
    assert!(matches!(err, MigrateError::Ledger { .. }));
    assert!(table_exists(&f.backend, "users"));
}

#[test]
fn non_transactional_up_records_version() {
    let f = fixture();
    let m = Migration {
        options: MigrationOptions { transaction: false },
        ..users()
    };

    f.executor.up(&m, &f.store).unwrap();
    assert!(recorded(&f.store, 20170329154959));
}

#[test]
fn empty_up_script_only_records() {
    let f = fixture();
    let m = migration(9, "  \n", "");

    f.executor.up(&m, &f.store).unwrap();
    assert!(recorded(&f.store, 9));
}
