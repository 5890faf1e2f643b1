//! In-memory/no-op capability implementations (spec.md §5): every real
//! `Embedder`, `LanguageModel`, and `CommitSink` lives outside this
//! workspace. These satisfy the trait bounds for a `Cortex` that simply
//! doesn't have one configured, and double as deterministic test doubles.

use std::sync::atomic::{AtomicBool, Ordering};

use cortex_core::errors::CortexResult;
use cortex_core::traits::{CommitReceipt, CommitSink, CortexEvent, Embedder, EventSink, LanguageModel};

/// An `Embedder` that was never configured. `embed` always fails, so
/// callers fall back to keyword-only recall and rule-based linking rather
/// than silently returning a meaningless zero vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEmbedder;

impl Embedder for NoopEmbedder {
    async fn embed(&self, _text: &str) -> CortexResult<Vec<f32>> {
        Err(cortex_core::errors::CortexError::CapabilityError(
            cortex_core::errors::CapabilityError::Unavailable { capability: "embedder".to_string() },
        ))
    }

    async fn embed_batch(&self, texts: &[String]) -> CortexResult<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize {
        0
    }
}

/// A `LanguageModel` that was never configured. `complete` always fails,
/// which `DreamEngine::run_cycle` treats the same as "no model": the
/// reflection/contradiction/emergence phases short-circuit.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLanguageModel;

impl LanguageModel for NoopLanguageModel {
    async fn complete(&self, _prompt: &str) -> CortexResult<String> {
        Err(cortex_core::errors::CortexError::CapabilityError(
            cortex_core::errors::CapabilityError::Unavailable { capability: "language_model".to_string() },
        ))
    }
}

/// A `CommitSink` that was never configured. Every call reports
/// `committed: false` so `Ingestor::store` falls back to the
/// `sha256(content)` external signature (spec.md §9).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCommitSink;

impl CommitSink for NoopCommitSink {
    async fn commit(&self, _hash_id: &str, _content: &str) -> CortexResult<CommitReceipt> {
        Ok(CommitReceipt { signature: String::new(), committed: false })
    }
}

/// An `EventSink` that was never configured: events still fan out to
/// in-process `on` handlers via `EventBus`, just not to an external sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    async fn publish(&self, _event: CortexEvent) -> CortexResult<()> {
        Ok(())
    }
}

/// Deterministic `LanguageModel` test double: returns the same fixed
/// completion regardless of prompt, useful for exercising the dream
/// cycle's reflection/emergence phases without a real model.
#[derive(Debug, Clone)]
pub struct FixedLanguageModel {
    pub response: String,
}

impl FixedLanguageModel {
    pub fn new(response: impl Into<String>) -> Self {
        Self { response: response.into() }
    }
}

impl LanguageModel for FixedLanguageModel {
    async fn complete(&self, _prompt: &str) -> CortexResult<String> {
        Ok(self.response.clone())
    }
}

/// Deterministic `Embedder` test double: a fixed-dimension, content-free
/// vector (all zero but for the first component, which encodes length so
/// distinct inputs don't collide under cosine similarity).
#[derive(Debug, Clone, Copy)]
pub struct DeterministicEmbedder {
    pub dimensions: usize,
}

impl DeterministicEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Embedder for DeterministicEmbedder {
    async fn embed(&self, text: &str) -> CortexResult<Vec<f32>> {
        let mut v = vec![0.0f32; self.dimensions.max(1)];
        v[0] = text.len() as f32;
        Ok(v)
    }

    async fn embed_batch(&self, texts: &[String]) -> CortexResult<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Always-committing `CommitSink` test double, with a latch to flip to
/// failing mid-test for fallback-path coverage.
#[derive(Debug, Default)]
pub struct StubCommitSink {
    fail: AtomicBool,
}

impl StubCommitSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }
}

impl CommitSink for StubCommitSink {
    async fn commit(&self, hash_id: &str, _content: &str) -> CortexResult<CommitReceipt> {
        if self.fail.load(Ordering::SeqCst) {
            return Ok(CommitReceipt { signature: String::new(), committed: false });
        }
        Ok(CommitReceipt { signature: format!("sig-{hash_id}"), committed: true })
    }
}
