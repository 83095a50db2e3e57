//! Shared utilities for CLI commands

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tm_core::{Config, FileSystemSource, Orchestrator};
use tm_db::{is_in_memory, DuckDbBackend, DuckDbExecutor, DuckDbStore, URL_SCHEME};

use crate::cli::GlobalArgs;

pub(crate) type DuckDbOrchestrator = Orchestrator<FileSystemSource, DuckDbStore, DuckDbExecutor>;

/// Whether a command changes the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    ReadOnly,
    ReadWrite,
}

/// Print a status line unless `--quiet` was given.
macro_rules! status {
    ($global:expr, $($arg:tt)*) => {
        if !$global.quiet {
            println!($($arg)*);
        }
    };
}
pub(crate) use status;

/// Load tidemark.yml from the project directory, or defaults if absent.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    let project_dir = Path::new(&global.project_dir);
    Config::load_or_default(project_dir)
        .with_context(|| format!("Failed to load config from {}", project_dir.display()))
}

/// `--src` as given, else `migrations_dir` under the project directory.
pub(crate) fn migrations_dir(global: &GlobalArgs, config: &Config) -> PathBuf {
    match &global.src {
        Some(src) => PathBuf::from(src),
        None => config.migrations_dir_absolute(Path::new(&global.project_dir)),
    }
}

/// `--url` as given, else `database.path` with relative files resolved
/// against the project directory.
pub(crate) fn database_location(global: &GlobalArgs, config: &Config) -> String {
    if let Some(url) = &global.url {
        return url.clone();
    }

    let path = config
        .database
        .path
        .strip_prefix(URL_SCHEME)
        .unwrap_or(&config.database.path);
    if is_in_memory(path) || Path::new(path).is_absolute() {
        path.to_string()
    } else {
        Path::new(&global.project_dir)
            .join(path)
            .display()
            .to_string()
    }
}

/// Wire the filesystem source, DuckDB ledger and DuckDB executor together.
///
/// [`Access::ReadWrite`] refuses an in-memory database, whose ledger would
/// vanish when the process exits.
pub(crate) fn build_orchestrator(
    global: &GlobalArgs,
    access: Access,
) -> Result<DuckDbOrchestrator> {
    let config = load_config(global)?;
    let location = database_location(global, &config);
    if access == Access::ReadWrite && is_in_memory(&location) {
        bail!(
            "No database configured: pass --url, set DATABASE_URL, or set database.path in tidemark.yml"
        );
    }
    log::debug!("Opening database {location}");

    let backend = Arc::new(
        DuckDbBackend::new(&location)
            .with_context(|| format!("Failed to open database {location}"))?,
    );
    let store = DuckDbStore::with_table(Arc::clone(&backend), &config.database.ledger_table)?;

    Ok(Orchestrator::new(
        FileSystemSource::new(migrations_dir(global, &config)),
        store,
        DuckDbExecutor::new(backend),
    ))
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
