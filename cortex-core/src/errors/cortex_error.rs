use super::{CapabilityError, ConsolidationError, GraphError, RetrievalError, StorageError};

/// Top-level error type for the Cortex memory system.
/// All subsystem errors convert into this via `From` impls; this is the
/// type every public operation in `spec.md` §6 returns, with the
/// opaque category taxonomy of §7 encoded as variants below.
#[derive(Debug, thiserror::Error)]
pub enum CortexError {
    /// §7 `ValidationError` — invalid input (range, encoding, empty field).
    #[error("validation error: {0}")]
    ValidationError(String),

    /// §7 `Conflict` — unique constraint violation, carrying the existing id when known.
    #[error("conflict: {message}")]
    Conflict {
        message: String,
        existing_id: Option<i64>,
    },

    /// §7 `NotFound` — referenced record or entity absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// §7 `Cancelled` — caller-initiated cancellation. Never logged as an error.
    #[error("cancelled")]
    Cancelled,

    /// §7 `Timeout` — a bounded operation exceeded its budget.
    #[error("operation timed out: {0}")]
    Timeout(String),

    /// §7 `CapabilityUnavailable` / other capability failures.
    #[error("capability error: {0}")]
    CapabilityError(#[from] CapabilityError),

    /// §7 `StoreUnavailable` — all store retries exhausted.
    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("graph error: {0}")]
    GraphError(#[from] GraphError),

    #[error("retrieval error: {0}")]
    RetrievalError(#[from] RetrievalError),

    #[error("consolidation error: {0}")]
    ConsolidationError(#[from] ConsolidationError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("concurrency error: {0}")]
    ConcurrencyError(String),

    #[error("config error: {0}")]
    ConfigError(String),
}

impl CortexError {
    /// True for the error categories spec.md §7 says `store` swallows,
    /// returning `None` instead of raising.
    pub fn is_swallowed_by_store(&self) -> bool {
        matches!(self, CortexError::ValidationError(_) | CortexError::Conflict { .. })
    }
}

/// Convenience type alias.
pub type CortexResult<T> = Result<T, CortexError>;
