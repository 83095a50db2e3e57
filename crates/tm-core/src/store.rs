//! Stores hold the durable ledger of applied migrations.

use crate::clock::{Clock, SystemClock};
use crate::error::{MigrateError, MigrateResult};
use crate::migration::Migration;
use crate::migrations::Migrations;
use crate::source::Source;
use crate::version::Version;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// The ledger of applied migrations.
///
/// [`Source::collect`] on a store returns the applied entries, newest first,
/// carrying version and ledger metadata only (no scripts). Implementations
/// create their backing structure lazily before any read or write.
pub trait Store: Source {
    /// Backend handle an executor passes in so that the ledger mutation joins
    /// its unit of work. `None` means the store uses its own handle.
    type Context;

    /// Record `migration` as applied.
    ///
    /// Fails with [`MigrateError::DuplicateVersion`] if the version is already
    /// recorded.
    fn insert(&self, migration: &Migration, ctx: Option<&Self::Context>) -> MigrateResult<()>;

    /// Delete the applied record for `migration`. Removing an absent record
    /// succeeds.
    fn remove(&self, migration: &Migration, ctx: Option<&Self::Context>) -> MigrateResult<()>;
}

#[derive(Debug, Clone)]
struct LedgerEntry {
    version_tag: Option<String>,
    applied_at: DateTime<Utc>,
}

/// A process-local ledger.
///
/// Useful for dry runs and tests; it enforces the same uniqueness and
/// idempotent-remove rules as a database ledger.
pub struct MemoryStore {
    ledger: Mutex<BTreeMap<Version, LedgerEntry>>,
    clock: Box<dyn Clock + Send + Sync>,
}

impl MemoryStore {
    /// Create an empty ledger stamped by the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Create an empty ledger stamped by `clock`.
    pub fn with_clock(clock: impl Clock + Send + Sync + 'static) -> Self {
        Self {
            ledger: Mutex::new(BTreeMap::new()),
            clock: Box::new(clock),
        }
    }

    /// Create a ledger that already records `applied`.
    pub fn with_applied(applied: impl IntoIterator<Item = Migration>) -> Self {
        let store = Self::new();
        let now = store.clock.now();
        if let Ok(mut ledger) = store.ledger.lock() {
            for m in applied {
                ledger.insert(
                    m.version,
                    LedgerEntry {
                        version_tag: m.version_tag,
                        applied_at: m.applied_at.unwrap_or(now),
                    },
                );
            }
        }
        store
    }

    /// Whether `version` is recorded.
    pub fn contains(&self, version: Version) -> MigrateResult<bool> {
        Ok(self.lock()?.contains_key(&version))
    }

    fn lock(&self) -> MigrateResult<MutexGuard<'_, BTreeMap<Version, LedgerEntry>>> {
        self.ledger
            .lock()
            .map_err(|e| MigrateError::ledger(format!("memory ledger poisoned: {e}")))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for MemoryStore {
    fn collect(&self) -> MigrateResult<Migrations> {
        let ledger = self.lock()?;
        let mut applied: Vec<Migration> = ledger
            .iter()
            .map(|(version, entry)| Migration {
                version_tag: entry.version_tag.clone(),
                applied_at: Some(entry.applied_at),
                ..Migration::with_version(*version)
            })
            .collect();
        applied.sort_by(|a, b| {
            b.applied_at
                .cmp(&a.applied_at)
                .then(b.version.cmp(&a.version))
        });
        Ok(applied.into())
    }
}

impl Store for MemoryStore {
    type Context = ();

    fn insert(&self, migration: &Migration, _ctx: Option<&()>) -> MigrateResult<()> {
        let mut ledger = self.lock()?;
        if ledger.contains_key(&migration.version) {
            return Err(MigrateError::DuplicateVersion {
                version: migration.version,
            });
        }
        ledger.insert(
            migration.version,
            LedgerEntry {
                version_tag: migration.version_tag.clone(),
                applied_at: self.clock.now(),
            },
        );
        Ok(())
    }

    fn remove(&self, migration: &Migration, _ctx: Option<&()>) -> MigrateResult<()> {
        self.lock()?.remove(&migration.version);
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
