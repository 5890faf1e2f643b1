use serde::{Deserialize, Serialize};

/// Shared tunables for invoking the injected capabilities (`Embedder`,
/// `LanguageModel`, `CommitSink`) per spec.md §5.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityConfig {
    /// Per-capability semaphore concurrency.
    pub max_concurrency: usize,
    pub llm_timeout_ms: u64,
    pub embedding_timeout_ms: u64,
    pub commit_timeout_ms: u64,
    /// Backoff applied after a capability call fails before the next attempt.
    pub backoff_ms: u64,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            llm_timeout_ms: 60_000,
            embedding_timeout_ms: 30_000,
            commit_timeout_ms: 30_000,
            backoff_ms: 500,
        }
    }
}
