//! Executors run a migration's script and update the ledger as one unit.

use crate::error::MigrateResult;
use crate::migration::Migration;
use crate::store::Store;

/// Applies and reverts single migrations against a [`Store`].
///
/// For transactional backends the script and the ledger mutation commit or
/// roll back together. Failures are reported as:
///
/// - [`MigrateError::ScriptExecution`](crate::MigrateError::ScriptExecution):
///   the script failed and nothing was recorded.
/// - [`MigrateError::Ledger`](crate::MigrateError::Ledger) (or
///   [`DuplicateVersion`](crate::MigrateError::DuplicateVersion)): the script
///   ran but the ledger could not be updated.
/// - [`MigrateError::Irreversible`](crate::MigrateError::Irreversible): `down`
///   was called on a migration without a reverse script.
pub trait Executor<S: Store + ?Sized> {
    /// Run the forward script and record the version in `store`.
    fn up(&self, migration: &Migration, store: &S) -> MigrateResult<()>;

    /// Run the reverse script and remove the version from `store`.
    fn down(&self, migration: &Migration, store: &S) -> MigrateResult<()>;
}
