//! Per-migration execution options read from `options.json`.

use crate::error::{MigrateError, MigrateResult};
use crate::serde_helpers::default_true;
use serde::{Deserialize, Serialize};

/// File name of the optional options payload inside a migration directory.
pub const OPTIONS_FILE: &str = "options.json";

/// Execution configuration for a single migration.
///
/// Unknown keys are ignored so that older binaries can read newer payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationOptions {
    /// Statement grouping: run the script and its ledger update inside one
    /// transaction (`true`, the baseline) or let each statement commit on its
    /// own (`false`, for statements a transaction cannot contain).
    #[serde(default = "default_true")]
    pub transaction: bool,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self { transaction: true }
    }
}

impl MigrationOptions {
    /// Parse an options payload.
    ///
    /// `None` (no `options.json`) and an empty payload yield the baseline
    /// options. Malformed JSON is an error.
    pub fn parse(path: &str, payload: Option<&[u8]>) -> MigrateResult<Self> {
        match payload {
            None => Ok(Self::default()),
            Some(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Self::default()),
            Some(bytes) => serde_json::from_slice(bytes).map_err(|e| MigrateError::Parse {
                path: path.to_string(),
                message: format!("invalid {OPTIONS_FILE}: {e}"),
            }),
        }
    }
}
