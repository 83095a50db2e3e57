//! Sources enumerate every migration that is available to run.

use crate::error::{MigrateError, MigrateResult};
use crate::migration::Migration;
use crate::migrations::Migrations;
use rust_embed::RustEmbed;
use std::collections::BTreeSet;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Enumerates migrations.
///
/// Implementations re-read their medium on every call; nothing is cached.
pub trait Source {
    /// Return the full set of migrations, ascending by version.
    ///
    /// A single unreadable or malformed migration fails the whole call.
    fn collect(&self) -> MigrateResult<Migrations>;
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn collect(&self) -> MigrateResult<Migrations> {
        (**self).collect()
    }
}

impl<S: Source + ?Sized> Source for &S {
    fn collect(&self) -> MigrateResult<Migrations> {
        (**self).collect()
    }
}

/// An in-memory collection is its own source.
impl Source for Migrations {
    fn collect(&self) -> MigrateResult<Migrations> {
        Ok(self.clone().sorted())
    }
}

/// Reads migrations from `<root>/<version>_<description>/` directories.
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    root: PathBuf,
}

impl FileSystemSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory this source scans.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Source for FileSystemSource {
    fn collect(&self) -> MigrateResult<Migrations> {
        let root_error = |e: io::Error| MigrateError::Read {
            path: self.root.display().to_string(),
            message: e.to_string(),
        };

        let mut migrations = Migrations::new();
        for entry in std::fs::read_dir(&self.root).map_err(root_error)? {
            let entry = entry.map_err(root_error)?;
            let path = entry.path();
            if is_hidden(&entry.file_name().to_string_lossy()) {
                continue;
            }

            let entry_error = |e: io::Error| MigrateError::Read {
                path: path.display().to_string(),
                message: e.to_string(),
            };
            let file_type = entry.file_type().map_err(entry_error)?;
            let is_dir = if file_type.is_symlink() {
                std::fs::metadata(&path).map_err(entry_error)?.is_dir()
            } else {
                file_type.is_dir()
            };
            if !is_dir {
                continue;
            }

            let path_str = path.to_str().ok_or_else(|| MigrateError::Parse {
                path: path.display().to_string(),
                message: "migration path is not valid UTF-8".to_string(),
            })?;
            migrations.push(Migration::from_bytes(path_str, |p| std::fs::read(p))?);
        }

        log::debug!(
            "Collected {} migrations from {}",
            migrations.len(),
            self.root.display()
        );
        finish(migrations, &self.root.display().to_string())
    }
}

/// Reads migrations compiled into the binary with `rust-embed`.
///
/// Asset paths look like `<prefix>/<version>_<description>/up.sql`; files
/// directly under the prefix are ignored.
pub struct EmbeddedSource<E> {
    prefix: String,
    _assets: PhantomData<fn() -> E>,
}

impl<E: RustEmbed> EmbeddedSource<E> {
    /// Use every migration directory at the root of the embedded folder.
    pub fn new() -> Self {
        Self::with_prefix("")
    }

    /// Use only migration directories below `prefix` within the embedded folder.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().trim_matches('/').to_string(),
            _assets: PhantomData,
        }
    }

    fn migration_dirs(&self) -> BTreeSet<String> {
        E::iter()
            .filter_map(|asset| {
                let asset: &str = &asset;
                let relative = if self.prefix.is_empty() {
                    asset
                } else {
                    asset.strip_prefix(self.prefix.as_str())?.strip_prefix('/')?
                };
                let (dir, _file) = relative.split_once('/')?;
                (!is_hidden(dir)).then(|| self.qualify(dir))
            })
            .collect()
    }

    fn qualify(&self, dir: &str) -> String {
        if self.prefix.is_empty() {
            dir.to_string()
        } else {
            format!("{}/{dir}", self.prefix)
        }
    }

    fn read(path: &str) -> io::Result<Vec<u8>> {
        E::get(path)
            .map(|file| file.data.into_owned())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("asset {path}")))
    }
}

impl<E: RustEmbed> Default for EmbeddedSource<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: RustEmbed> Source for EmbeddedSource<E> {
    fn collect(&self) -> MigrateResult<Migrations> {
        let migrations = self
            .migration_dirs()
            .iter()
            .map(|dir| Migration::from_bytes(dir, Self::read))
            .collect::<MigrateResult<Migrations>>()?;

        log::debug!("Collected {} embedded migrations", migrations.len());
        let origin = if self.prefix.is_empty() {
            "embedded assets"
        } else {
            self.prefix.as_str()
        };
        finish(migrations, origin)
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Enforce version uniqueness and ascending order.
fn finish(migrations: Migrations, origin: &str) -> MigrateResult<Migrations> {
    if let Some(version) = migrations.duplicate_version() {
        return Err(MigrateError::Parse {
            path: origin.to_string(),
            message: format!("version {version} is defined more than once"),
        });
    }
    Ok(migrations.sorted())
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
