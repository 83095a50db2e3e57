//! The migration entity and its loader.
//!
//! A migration is one directory (or embedded asset prefix) named
//! `<version>_<description>` holding `up.sql`, an optional `down.sql` and an
//! optional `options.json`.

use crate::clock::Clock;
use crate::error::{MigrateError, MigrateResult};
use crate::options::{MigrationOptions, OPTIONS_FILE};
use crate::version::Version;
use chrono::{DateTime, Utc};
use std::io;

/// File name of the forward script.
pub const UP_FILE: &str = "up.sql";

/// File name of the reverse script.
pub const DOWN_FILE: &str = "down.sql";

/// One versioned schema change.
///
/// Instances read from a source carry the scripts; instances read from a
/// ledger carry only the version and ledger metadata (`version_tag`,
/// `applied_at`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Migration {
    /// Ordering key, unique within any collection
    pub version: Version,

    /// Optional boundary label recorded in the ledger
    pub version_tag: Option<String>,

    /// Origin identifier; empty for synthesized instances
    pub path: String,

    /// Forward script
    pub up_sql: Vec<u8>,

    /// Reverse script; empty for irreversible migrations
    pub down_sql: Vec<u8>,

    /// Execution options
    pub options: MigrationOptions,

    /// When the ledger recorded this version, if known
    pub applied_at: Option<DateTime<Utc>>,
}

impl Migration {
    /// Synthesize a script-less migration carrying only a version.
    pub fn with_version(version: impl Into<Version>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    /// True when a reverse script is present.
    pub fn reversible(&self) -> bool {
        !self.down_sql.is_empty()
    }

    /// True for any migration with a non-blank origin path.
    pub fn persistable(&self) -> bool {
        !self.path.is_empty()
    }

    /// Generate a blank migration named after `name`, versioned from `clock`.
    ///
    /// The description keeps only `[a-z0-9_]`; a name with nothing left
    /// after normalization is a Parse error.
    pub fn generate(name: &str, clock: &dyn Clock) -> MigrateResult<Self> {
        let version = Version::from_datetime(clock.now())?;
        let description = normalize_name(name);
        if description.is_empty() {
            return Err(MigrateError::Parse {
                path: name.to_string(),
                message: "migration name has no usable characters".to_string(),
            });
        }

        let path = format!("{version}_{description}");
        Version::from_path(&path)?;
        Ok(Self {
            version,
            path,
            ..Self::default()
        })
    }

    /// Load a migration rooted at `path` through a byte-reading function.
    ///
    /// `read` maps a path to the file's bytes and reports absence with an
    /// [`io::ErrorKind::NotFound`] error; `std::fs::read` satisfies it
    /// directly. `up.sql` is required, `down.sql` and `options.json` are
    /// optional.
    pub fn from_bytes<F>(path: &str, read: F) -> MigrateResult<Self>
    where
        F: Fn(&str) -> io::Result<Vec<u8>>,
    {
        let version = Version::from_path(path)?;

        let up_path = join(path, UP_FILE);
        let up_sql = read(&up_path).map_err(|e| read_error(&up_path, &e))?;
        let down_sql = read_optional(&read, &join(path, DOWN_FILE))?.unwrap_or_default();

        let options_path = join(path, OPTIONS_FILE);
        let options_payload = read_optional(&read, &options_path)?;
        let options = MigrationOptions::parse(&options_path, options_payload.as_deref())?;

        Ok(Self {
            version,
            version_tag: None,
            path: path.to_string(),
            up_sql,
            down_sql,
            options,
            applied_at: None,
        })
    }

    /// Forward script as text.
    pub fn up_script(&self) -> MigrateResult<&str> {
        script_text(self, &self.up_sql, UP_FILE)
    }

    /// Reverse script as text.
    pub fn down_script(&self) -> MigrateResult<&str> {
        script_text(self, &self.down_sql, DOWN_FILE)
    }
}

fn read_optional<F>(read: &F, path: &str) -> MigrateResult<Option<Vec<u8>>>
where
    F: Fn(&str) -> io::Result<Vec<u8>>,
{
    match read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(read_error(path, &e)),
    }
}

fn read_error(path: &str, err: &io::Error) -> MigrateError {
    MigrateError::Read {
        path: path.to_string(),
        message: err.to_string(),
    }
}

fn script_text<'a>(migration: &Migration, bytes: &'a [u8], file: &str) -> MigrateResult<&'a str> {
    std::str::from_utf8(bytes).map_err(|e| MigrateError::Parse {
        path: join(&migration.path, file),
        message: format!("script is not valid UTF-8: {e}"),
    })
}

/// Join a migration path and a file name with `/`, which both the filesystem
/// and embedded asset paths accept.
pub(crate) fn join(path: &str, file: &str) -> String {
    format!("{}/{file}", path.trim_end_matches(['/', '\\']))
}

/// `CreateUsers table` -> `create_users_table`
fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.trim().chars() {
        if !c.is_ascii_alphanumeric() {
            if !out.ends_with('_') && !out.is_empty() {
                out.push('_');
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower {
            out.push('_');
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        out.extend(c.to_lowercase());
    }
    out.trim_end_matches('_').to_string()
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
