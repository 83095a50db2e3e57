//! Error types for tm-core

use crate::version::Version;
use thiserror::Error;

/// Errors raised while collecting, recording, applying or reverting migrations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// MG001: A migration medium could not be enumerated or read
    #[error("[MG001] Failed to read '{path}': {message}")]
    Read { path: String, message: String },

    /// MG002: Malformed version prefix or options payload
    #[error("[MG002] Failed to parse '{path}': {message}")]
    Parse { path: String, message: String },

    /// MG003: The ledger already holds this version
    #[error("[MG003] Version {version} is already recorded as applied")]
    DuplicateVersion { version: Version },

    /// MG004: Revert boundary is not among the applied versions
    #[error("[MG004] Version {version} is not among the applied migrations")]
    NotFound { version: Version },

    /// MG005: Revert requested for a migration without a reverse script
    #[error("[MG005] Migration {version} is irreversible: no down.sql")]
    Irreversible { version: Version },

    /// MG006: The migration script itself failed
    #[error("[MG006] Migration {version} failed: {message}")]
    ScriptExecution { version: Version, message: String },

    /// MG007: Recording or removing the ledger entry failed
    #[error("[MG007] Ledger update failed: {message}")]
    Ledger { message: String },

    /// MG008: Configuration file not found
    #[error("[MG008] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// MG009: Failed to parse configuration file
    #[error("[MG009] Failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// MG010: Invalid configuration value
    #[error("[MG010] Invalid config: {message}")]
    ConfigInvalid { message: String },
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;

impl MigrateError {
    /// Shorthand for a [`MigrateError::Ledger`] built from any displayable cause.
    pub fn ledger(message: impl std::fmt::Display) -> Self {
        MigrateError::Ledger {
            message: message.to_string(),
        }
    }
}
