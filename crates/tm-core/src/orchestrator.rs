//! Stateless coordination of a source, a store and an executor.

use crate::error::{MigrateError, MigrateResult};
use crate::executor::Executor;
use crate::migration::Migration;
use crate::migrations::Migrations;
use crate::source::Source;
use crate::store::Store;
use crate::version::Version;

/// Answers "what is available / applied / pending" and drives single
/// applies and reverts.
///
/// Holds no state of its own: every query re-reads the source and the store.
/// Batch runs (all unapplied, or everything after a boundary) are left to the
/// caller and should stop at the first error; each completed step is already
/// committed.
pub struct Orchestrator<Src, St, Ex> {
    source: Src,
    store: St,
    executor: Ex,
}

impl<Src, St, Ex> Orchestrator<Src, St, Ex>
where
    Src: Source,
    St: Store,
    Ex: Executor<St>,
{
    pub fn new(source: Src, store: St, executor: Ex) -> Self {
        Self {
            source,
            store,
            executor,
        }
    }

    pub fn source(&self) -> &Src {
        &self.source
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    pub fn executor(&self) -> &Ex {
        &self.executor
    }

    /// All available migrations, ascending.
    pub fn present(&self) -> MigrateResult<Migrations> {
        Ok(self.source.collect()?.sorted())
    }

    /// Available migrations whose version is not in the ledger, ascending.
    pub fn unapplied(&self) -> MigrateResult<Migrations> {
        let applied = self.store.collect()?;
        let available = self.source.collect()?;
        Ok(applied.except(&available).sorted())
    }

    /// The highest-version available migration.
    pub fn latest(&self) -> MigrateResult<Option<Migration>> {
        Ok(self.source.collect()?.latest().cloned())
    }

    /// The highest-version applied migration, as read from the source.
    ///
    /// Returns `None` when nothing is applied, and also when the newest
    /// applied version no longer exists in the source.
    pub fn current(&self) -> MigrateResult<Option<Migration>> {
        let applied = self.store.collect()?;
        let Some(newest) = applied.latest() else {
            return Ok(None);
        };

        let available = self.source.collect()?;
        let current = Migrations::from(vec![newest.clone()])
            .intersect(&available)
            .into_iter()
            .next();

        if current.is_none() {
            log::warn!(
                "Applied version {} is not present in the migration source",
                newest.version
            );
        }
        Ok(current)
    }

    /// Applied migrations with a version above `version`, ascending.
    ///
    /// The boundary is numeric: the ledger is scanned from the highest version
    /// down until `version` is met. Fails with [`MigrateError::NotFound`] if
    /// `version` was never applied. Entries come from the source (so their
    /// reverse scripts are available) with ledger metadata attached; applied
    /// versions missing from the source are skipped.
    pub fn applied_after(&self, version: Version) -> MigrateResult<Migrations> {
        let mut applied = self.store.collect()?;
        applied.reverse_sort();

        let mut after = Migrations::new();
        let mut found = false;
        for migration in applied {
            if migration.version == version {
                found = true;
                break;
            }
            after.push(migration);
        }

        if !found {
            return Err(MigrateError::NotFound { version });
        }

        let available = self.source.collect()?;
        for dangling in available.except(&after).iter() {
            log::warn!(
                "Applied version {} is not present in the migration source; skipping",
                dangling.version
            );
        }

        Ok(after.intersect(&available).sorted())
    }

    /// Apply one migration.
    pub fn apply(&self, migration: &Migration) -> MigrateResult<()> {
        log::debug!("Applying migration {}", migration.version);
        self.executor.up(migration, &self.store)
    }

    /// Revert one migration.
    pub fn revert(&self, migration: &Migration) -> MigrateResult<()> {
        log::debug!("Reverting migration {}", migration.version);
        self.executor.down(migration, &self.store)
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
