//! tm-core - Core library for tidemark
//!
//! This crate provides the migration model, the version-keyed set algebra,
//! the `Source`/`Store`/`Executor` capability traits with their filesystem,
//! embedded and in-memory variants, the orchestrator that composes them, and
//! project configuration. It has no database driver dependency; see `tm-db`.

pub mod clock;
pub mod config;
pub mod error;
pub mod executor;
pub mod migration;
pub mod migrations;
pub mod options;
pub mod orchestrator;
pub(crate) mod serde_helpers;
pub mod source;
pub mod store;
pub mod version;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, DatabaseConfig};
pub use error::{MigrateError, MigrateResult};
pub use executor::Executor;
pub use migration::{Migration, DOWN_FILE, UP_FILE};
pub use migrations::Migrations;
pub use options::{MigrationOptions, OPTIONS_FILE};
pub use orchestrator::Orchestrator;
pub use source::{EmbeddedSource, FileSystemSource, Source};
pub use store::{MemoryStore, Store};
pub use version::Version;
