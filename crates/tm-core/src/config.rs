//! Configuration types and parsing for tidemark.yml

use crate::error::{MigrateError, MigrateResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file names looked up in a project directory, in order.
pub const CONFIG_FILES: [&str; 2] = ["tidemark.yml", "tidemark.yaml"];

/// Project configuration from tidemark.yml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding `<version>_<description>/` migration folders
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: String,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database path (DuckDB file or `:memory:`)
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Table recording applied versions, optionally schema-qualified
    #[serde(default = "default_ledger_table")]
    pub ledger_table: String,
}

fn default_migrations_dir() -> String {
    "database/migrations".to_string()
}

fn default_db_path() -> String {
    ":memory:".to_string()
}

fn default_ledger_table() -> String {
    "schema_migrations".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            ledger_table: default_ledger_table(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            migrations_dir: default_migrations_dir(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> MigrateResult<Self> {
        if !path.exists() {
            return Err(MigrateError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| MigrateError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory.
    /// Looks for tidemark.yml or tidemark.yaml
    pub fn load_from_dir(dir: &Path) -> MigrateResult<Self> {
        match CONFIG_FILES.iter().map(|f| dir.join(f)).find(|p| p.exists()) {
            Some(path) => Self::load(&path),
            None => Err(MigrateError::ConfigNotFound {
                path: dir.join(CONFIG_FILES[0]).display().to_string(),
            }),
        }
    }

    /// Like [`load_from_dir`](Self::load_from_dir), falling back to defaults
    /// when the directory has no config file.
    pub fn load_or_default(dir: &Path) -> MigrateResult<Self> {
        match Self::load_from_dir(dir) {
            Err(MigrateError::ConfigNotFound { .. }) => {
                log::debug!("No config file in {}, using defaults", dir.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Migrations directory resolved against the project root
    pub fn migrations_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations_dir)
    }

    /// Validate the configuration
    pub fn validate(&self) -> MigrateResult<()> {
        if self.migrations_dir.trim().is_empty() {
            return Err(MigrateError::ConfigInvalid {
                message: "migrations_dir cannot be empty".to_string(),
            });
        }
        if !is_table_identifier(&self.database.ledger_table) {
            return Err(MigrateError::ConfigInvalid {
                message: format!(
                    "ledger_table '{}' must be an identifier such as 'schema_migrations' or 'ops.schema_migrations'",
                    self.database.ledger_table
                ),
            });
        }
        Ok(())
    }
}

/// `name` or `schema.name`, each part `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_table_identifier(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() <= 2
        && parts.iter().all(|part| {
            let mut chars = part.chars();
            chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
