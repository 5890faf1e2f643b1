use crate::errors::CortexResult;

/// Turns text into a dense vector for similarity-based association and
/// vector recall (spec.md §4.3, §4.5). A concrete implementation lives
/// outside this workspace; callers supply one at construction time.
#[allow(async_fn_in_trait)]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> CortexResult<Vec<f32>>;
    async fn embed_batch(&self, texts: &[String]) -> CortexResult<Vec<Vec<f32>>>;
    fn dimensions(&self) -> usize;
}
