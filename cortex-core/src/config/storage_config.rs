use serde::{Deserialize, Serialize};

/// Configuration for the SQLite-backed `KVStore` implementation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file. `:memory:` opens an in-memory store.
    pub db_path: String,
    /// Size of the read-connection pool (WAL mode allows concurrent readers).
    pub read_pool_size: usize,
    /// Transient-error retry attempts before surfacing `StoreUnavailable`.
    pub max_retries: u32,
    /// Backoff schedule in milliseconds, one entry per retry attempt.
    pub retry_backoff_ms: Vec<u64>,
    /// Default timeout for a single store operation.
    pub operation_timeout_ms: u64,
    /// Embedding vector dimension `D`.
    pub embedding_dimensions: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: ":memory:".to_string(),
            read_pool_size: 4,
            max_retries: 3,
            retry_backoff_ms: vec![100, 400, 1600],
            operation_timeout_ms: 10_000,
            embedding_dimensions: 1024,
        }
    }
}
