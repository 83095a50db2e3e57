//! tm-db - DuckDB backend for tidemark
//!
//! Provides a shared connection handle, a [`tm_core::Store`] that keeps the
//! ledger in a DuckDB table, and a [`tm_core::Executor`] that runs each
//! migration and its ledger update as one transaction.

pub mod connection;
pub mod error;
pub mod executor;
pub mod store;

pub use connection::{is_in_memory, with_transaction, DuckDbBackend, URL_SCHEME};
pub use error::{DbError, DbResult};
pub use executor::DuckDbExecutor;
pub use store::{DuckDbStore, DEFAULT_LEDGER_TABLE};
