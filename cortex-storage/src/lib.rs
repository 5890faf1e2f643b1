//! # cortex-storage
//!
//! SQLite persistence for the Cortex memory system. Implements
//! [`cortex_core::traits::KVStore`] on top of `rusqlite`: a single write
//! connection plus a small read pool (WAL mode). Schema is materialized by
//! an embedded migration on [`SqliteStore::open`]/[`SqliteStore::open_in_memory`].

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::SqliteStore;

/// Convert a `rusqlite` error into a `CortexError::StorageError`.
pub fn to_storage_err(msg: String) -> cortex_core::CortexError {
    cortex_core::errors::StorageError::SqliteError { message: msg }.into()
}
