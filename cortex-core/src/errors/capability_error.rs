/// Errors raised by the capability traits the core invokes (`Embedder`,
/// `LanguageModel`, `CommitSink`).
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("{capability} is not configured")]
    Unavailable { capability: String },

    #[error("{capability} call timed out after {budget_ms}ms")]
    Timeout { capability: String, budget_ms: u64 },

    #[error("{capability} call failed: {message}")]
    CallFailed { capability: String, message: String },

    #[error("{capability} call was cancelled")]
    Cancelled { capability: String },
}
