use crate::errors::CortexResult;

/// The reflection/summarization collaborator consolidation calls during
/// the reflection phase of the dream cycle (spec.md §4.8). Kept as a
/// single free-text prompt-in, text-out call: the consolidation engine
/// owns prompt construction and response parsing.
#[allow(async_fn_in_trait)]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> CortexResult<String>;
}
