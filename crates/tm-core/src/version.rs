//! Timestamp-derived migration versions.

use crate::error::{MigrateError, MigrateResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `chrono` format string a version is rendered from.
pub const VERSION_FORMAT: &str = "%Y%m%d%H%M%S";

/// Number of digits in a version prefix.
pub const VERSION_WIDTH: usize = 14;

/// Strongly-typed migration version.
///
/// Versions are `YYYYMMDDHHMMSS` timestamps stored as integers, so their
/// natural integer order is the order migrations apply in.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Wrap a raw integer version.
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Return the raw integer value.
    pub const fn as_i64(self) -> i64 {
        self.0
    }

    /// Derive a version from a point in time (second precision).
    ///
    /// Only years 1000..=9999 render as a 14-digit version.
    pub fn from_datetime(at: DateTime<Utc>) -> MigrateResult<Self> {
        let digits = at.format(VERSION_FORMAT).to_string();
        let out_of_range = || MigrateError::Parse {
            path: at.to_rfc3339(),
            message: format!("timestamp does not render as a {VERSION_WIDTH}-digit version"),
        };

        if digits.len() != VERSION_WIDTH
            || digits.starts_with('0')
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(out_of_range());
        }
        digits.parse().map(Self).map_err(|_| out_of_range())
    }

    /// Extract the version from the identifying segment of `path`.
    ///
    /// The last path segment must look like `<14 digits>_<description>`.
    pub fn from_path(path: &str) -> MigrateResult<Self> {
        let segment = path
            .trim_end_matches(['/', '\\'])
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default();

        let parse_error = |message: String| MigrateError::Parse {
            path: path.to_string(),
            message,
        };

        let Some((prefix, description)) = segment.split_once('_') else {
            return Err(parse_error(format!(
                "expected '<{VERSION_WIDTH}-digit version>_<description>', found '{segment}'"
            )));
        };

        if prefix.len() != VERSION_WIDTH || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(parse_error(format!(
                "version prefix '{prefix}' must be exactly {VERSION_WIDTH} digits"
            )));
        }
        if description.is_empty() {
            return Err(parse_error("missing description after version".to_string()));
        }

        prefix
            .parse()
            .map(Self)
            .map_err(|e| parse_error(format!("invalid version '{prefix}': {e}")))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Version {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self).map_err(|e| MigrateError::Parse {
            path: s.to_string(),
            message: format!("invalid version: {e}"),
        })
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
#[path = "version_test.rs"]
mod tests;
