use super::*;
use crate::store::MemoryStore;
use std::cell::RefCell;

const V1: i64 = 20170329154959;
const V2: i64 = 20170511172647;
const V3: i64 = 20180905150724;
const V4: i64 = 20180920181906;

fn available(versions: &[i64]) -> Migrations {
    versions
        .iter()
        .map(|v| Migration {
            path: format!("migrations/{v}_step"),
            up_sql: format!("-- up {v}").into_bytes(),
            down_sql: format!("-- down {v}").into_bytes(),
            ..Migration::with_version(*v)
        })
        .collect()
}

fn applied(versions: &[i64]) -> MemoryStore {
    MemoryStore::with_applied(versions.iter().map(|v| Migration::with_version(*v)))
}

fn raw(migrations: &Migrations) -> Vec<i64> {
    migrations.iter().map(|m| m.version.as_i64()).collect()
}

/// Records the ledger change without running any script.
struct LedgerExecutor;

impl Executor<MemoryStore> for LedgerExecutor {
    fn up(&self, migration: &Migration, store: &MemoryStore) -> MigrateResult<()> {
        store.insert(migration, None)
    }

    fn down(&self, migration: &Migration, store: &MemoryStore) -> MigrateResult<()> {
        if !migration.reversible() {
            return Err(MigrateError::Irreversible {
                version: migration.version,
            });
        }
        store.remove(migration, None)
    }
}

/// Records every call and fails `up` for one chosen version.
#[derive(Default)]
struct StubbedExecutor {
    calls: RefCell<Vec<(&'static str, Version)>>,
    fail_up_on: Option<Version>,
}

impl Executor<MemoryStore> for StubbedExecutor {
    fn up(&self, migration: &Migration, store: &MemoryStore) -> MigrateResult<()> {
        self.calls.borrow_mut().push(("up", migration.version));
        if self.fail_up_on == Some(migration.version) {
            return Err(MigrateError::ScriptExecution {
                version: migration.version,
                message: "syntax error".to_string(),
            });
        }
        store.insert(migration, None)
    }

    fn down(&self, migration: &Migration, _store: &MemoryStore) -> MigrateResult<()> {
        self.calls.borrow_mut().push(("down", migration.version));
        Ok(())
    }
}

#[test]
fn unapplied_with_empty_store_is_everything_ascending() {
    let source: Migrations = available(&[V3, V1, V4, V2]);
    let orchestrator = Orchestrator::new(source, MemoryStore::new(), LedgerExecutor);

    let pending = orchestrator.unapplied().unwrap();
    assert_eq!(raw(&pending), vec![V1, V2, V3, V4]);
}

#[test]
fn unapplied_is_empty_when_everything_is_applied() {
    let orchestrator = Orchestrator::new(
        available(&[V1, V2, V3, V4]),
        applied(&[V1, V2, V3, V4]),
        LedgerExecutor,
    );

    assert!(orchestrator.unapplied().unwrap().is_empty());
}

#[test]
fn unapplied_is_empty_when_source_is_empty() {
    let orchestrator =
        Orchestrator::new(Migrations::new(), applied(&[V1, V2]), LedgerExecutor);

    assert!(orchestrator.unapplied().unwrap().is_empty());
}

#[test]
fn present_is_sorted_and_idempotent() {
    let orchestrator =
        Orchestrator::new(available(&[V2, V1, V3]), MemoryStore::new(), LedgerExecutor);

    let first = orchestrator.present().unwrap();
    assert_eq!(raw(&first), vec![V1, V2, V3]);
    assert_eq!(first, orchestrator.present().unwrap());
    assert_eq!(first, orchestrator.source().collect().unwrap());
}

#[test]
fn latest_is_highest_available_version() {
    let orchestrator =
        Orchestrator::new(available(&[V3, V2, V1]), MemoryStore::new(), LedgerExecutor);
    assert_eq!(
        orchestrator.latest().unwrap().map(|m| m.version),
        Some(Version::new(V3))
    );

    let empty = Orchestrator::new(Migrations::new(), MemoryStore::new(), LedgerExecutor);
    assert!(empty.latest().unwrap().is_none());
}

#[test]
fn current_returns_source_entry_with_ledger_metadata() {
    let orchestrator =
        Orchestrator::new(available(&[V1, V2, V3]), applied(&[V1, V2]), LedgerExecutor);

    let current = orchestrator.current().unwrap().unwrap();
    assert_eq!(current.version, Version::new(V2));
    assert!(current.reversible());
    assert!(current.applied_at.is_some());
}

#[test]
fn current_is_none_when_nothing_applied() {
    let orchestrator =
        Orchestrator::new(available(&[V1]), MemoryStore::new(), LedgerExecutor);
    assert!(orchestrator.current().unwrap().is_none());
}

#[test]
fn current_is_none_for_dangling_applied_version() {
    let orchestrator =
        Orchestrator::new(available(&[V1, V2]), applied(&[V1, V2, V4]), LedgerExecutor);
    assert!(orchestrator.current().unwrap().is_none());
}

#[test]
fn applied_after_unknown_boundary_is_not_found() {
    let orchestrator =
        Orchestrator::new(available(&[V1, V2, V3]), applied(&[V1, V3]), LedgerExecutor);

    let err = orchestrator.applied_after(Version::new(V2)).unwrap_err();
    assert!(matches!(err, MigrateError::NotFound { version } if version.as_i64() == V2));
}

#[test]
fn applied_after_returns_newer_versions_ascending() {
    let orchestrator = Orchestrator::new(
        available(&[V1, V2, V3]),
        applied(&[V3, V2, V1]),
        LedgerExecutor,
    );

    let after = orchestrator.applied_after(Version::new(V1)).unwrap();
    assert_eq!(raw(&after), vec![V2, V3]);
    assert!(after.iter().all(|m| m.reversible()));
    assert!(after.iter().all(|m| m.applied_at.is_some()));
}

#[test]
fn applied_after_newest_version_is_empty() {
    let orchestrator =
        Orchestrator::new(available(&[V1, V2]), applied(&[V1, V2]), LedgerExecutor);
    assert!(orchestrator
        .applied_after(Version::new(V2))
        .unwrap()
        .is_empty());
}

#[test]
fn applied_after_skips_versions_missing_from_source() {
    let orchestrator = Orchestrator::new(
        available(&[V1, V2, V3]),
        applied(&[V1, V2, V3, V4]),
        LedgerExecutor,
    );

    let after = orchestrator.applied_after(Version::new(V1)).unwrap();
    assert_eq!(raw(&after), vec![V2, V3]);
}

#[test]
fn apply_and_revert_go_through_the_executor() {
    let orchestrator =
        Orchestrator::new(available(&[V1]), MemoryStore::new(), LedgerExecutor);
    let m = orchestrator.present().unwrap()[0].clone();

    orchestrator.apply(&m).unwrap();
    assert!(orchestrator.store().contains(m.version).unwrap());
    assert_eq!(
        orchestrator.current().unwrap().map(|c| c.version),
        Some(m.version)
    );

    orchestrator.revert(&m).unwrap();
    assert!(!orchestrator.store().contains(m.version).unwrap());
}

#[test]
fn revert_irreversible_leaves_ledger_untouched() {
    let orchestrator = Orchestrator::new(Migrations::new(), applied(&[V1]), LedgerExecutor);
    let irreversible = Migration {
        path: format!("migrations/{V1}_irreversible"),
        up_sql: b"SELECT 1;".to_vec(),
        ..Migration::with_version(V1)
    };

    let err = orchestrator.revert(&irreversible).unwrap_err();
    assert!(matches!(err, MigrateError::Irreversible { .. }));
    assert!(orchestrator.store().contains(Version::new(V1)).unwrap());
}

#[test]
fn apply_twice_is_rejected_by_ledger() {
    let orchestrator =
        Orchestrator::new(available(&[V1]), MemoryStore::new(), LedgerExecutor);
    let m = orchestrator.present().unwrap()[0].clone();

    orchestrator.apply(&m).unwrap();
    let err = orchestrator.apply(&m).unwrap_err();
    assert!(matches!(err, MigrateError::DuplicateVersion { .. }));
}

#[test]
fn batch_apply_stops_at_first_failure_and_keeps_earlier_steps() {
    let executor = StubbedExecutor {
        fail_up_on: Some(Version::new(V3)),
        ..StubbedExecutor::default()
    };
    let orchestrator =
        Orchestrator::new(available(&[V1, V2, V3, V4]), MemoryStore::new(), executor);

    let result: MigrateResult<()> = orchestrator
        .unapplied()
        .unwrap()
        .iter()
        .try_for_each(|m| orchestrator.apply(m));

    assert!(matches!(result, Err(MigrateError::ScriptExecution { .. })));
    assert_eq!(raw(&orchestrator.unapplied().unwrap()), vec![V3, V4]);
    assert_eq!(orchestrator.executor().calls.borrow().len(), 3);
}

#[test]
fn revert_delegates_to_executor_down() {
    let orchestrator = Orchestrator::new(
        available(&[V1]),
        applied(&[V1]),
        StubbedExecutor::default(),
    );
    let m = Migration::with_version(V1);

    orchestrator.revert(&m).unwrap();
    assert_eq!(
        orchestrator.executor().calls.borrow().as_slice(),
        &[("down", Version::new(V1))]
    );
}
