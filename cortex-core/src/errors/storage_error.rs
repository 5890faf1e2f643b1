/// Storage subsystem errors, surfaced from `KVStore` implementations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sqlite error: {message}")]
    SqliteError { message: String },

    #[error("duplicate hash id: {hash_id}")]
    Conflict { hash_id: String, existing_id: i64 },

    #[error("record not found: {id}")]
    NotFound { id: i64 },

    #[error("value out of range: {field} = {value}")]
    RangeViolation { field: String, value: String },

    #[error("migration failed: {0}")]
    MigrationFailed(String),

    #[error("store unavailable after {attempts} attempts: {message}")]
    Unavailable { attempts: u32, message: String },
}
