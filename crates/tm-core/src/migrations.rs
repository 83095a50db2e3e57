//! Ordered migration collections and the set algebra over them.
//!
//! Every operation is keyed by [`Version`] and runs in `O(n + m)` through a
//! hash index. None of them mutate their inputs.

use crate::migration::Migration;
use crate::version::Version;
use std::collections::{HashMap, HashSet};
use std::ops::Deref;

/// An ordered collection of migrations with unique versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Migrations(Vec<Migration>);

impl Migrations {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a migration.
    pub fn push(&mut self, migration: Migration) {
        self.0.push(migration);
    }

    /// Consume the collection and return the inner vector.
    pub fn into_inner(self) -> Vec<Migration> {
        self.0
    }

    /// Entries of `candidates` whose version is absent from `self`.
    pub fn except(&self, candidates: &Migrations) -> Migrations {
        let current: HashSet<Version> = self.0.iter().map(|m| m.version).collect();

        candidates
            .iter()
            .filter(|m| !current.contains(&m.version))
            .cloned()
            .collect()
    }

    /// Entries of `candidates` whose version is present in `self`, carrying
    /// the ledger metadata (`version_tag`, `applied_at`) of the matching entry
    /// in `self`.
    pub fn intersect(&self, candidates: &Migrations) -> Migrations {
        let current: HashMap<Version, &Migration> =
            self.0.iter().map(|m| (m.version, m)).collect();

        candidates
            .iter()
            .filter_map(|candidate| {
                current.get(&candidate.version).map(|known| Migration {
                    version_tag: known.version_tag.clone(),
                    applied_at: known.applied_at,
                    ..candidate.clone()
                })
            })
            .collect()
    }

    /// Sort ascending by version.
    pub fn sort(&mut self) {
        self.0.sort_by_key(|m| m.version);
    }

    /// Sort descending by version.
    pub fn reverse_sort(&mut self) {
        self.0.sort_by(|a, b| b.version.cmp(&a.version));
    }

    /// Sort ascending by apply time, breaking ties by version.
    ///
    /// Entries without an apply time sort first.
    pub fn sort_by_applied(&mut self) {
        self.0.sort_by(|a, b| {
            a.applied_at
                .cmp(&b.applied_at)
                .then(a.version.cmp(&b.version))
        });
    }

    /// Return a copy sorted ascending by version.
    pub fn sorted(mut self) -> Self {
        self.sort();
        self
    }

    /// The entry with the highest version.
    pub fn latest(&self) -> Option<&Migration> {
        self.0.iter().max_by_key(|m| m.version)
    }

    /// Look up an entry by version.
    pub fn find(&self, version: Version) -> Option<&Migration> {
        self.0.iter().find(|m| m.version == version)
    }

    /// Versions in collection order.
    pub fn versions(&self) -> Vec<Version> {
        self.0.iter().map(|m| m.version).collect()
    }

    /// First version that occurs more than once, if any.
    pub fn duplicate_version(&self) -> Option<Version> {
        let mut seen = HashSet::with_capacity(self.0.len());
        self.0
            .iter()
            .map(|m| m.version)
            .find(|version| !seen.insert(*version))
    }
}

impl Deref for Migrations {
    type Target = [Migration];

    fn deref(&self) -> &[Migration] {
        &self.0
    }
}

impl From<Vec<Migration>> for Migrations {
    fn from(migrations: Vec<Migration>) -> Self {
        Self(migrations)
    }
}

impl FromIterator<Migration> for Migrations {
    fn from_iter<I: IntoIterator<Item = Migration>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Migrations {
    type Item = Migration;
    type IntoIter = std::vec::IntoIter<Migration>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Migrations {
    type Item = &'a Migration;
    type IntoIter = std::slice::Iter<'a, Migration>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
#[path = "migrations_test.rs"]
mod tests;
