use serde::{Deserialize, Serialize};

/// Configuration for the hybrid recall pipeline (spec.md §4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub default_limit: usize,
    pub max_limit: usize,
    pub default_min_decay: f64,
    /// `queryCandidates` over-fetch factor relative to the caller's limit.
    pub candidate_overfetch_factor: usize,
    /// `vectorSearch` k is `vector_k_multiplier * limit`.
    pub vector_k_multiplier: usize,
    pub weight_recency: f64,
    pub weight_relevance: f64,
    pub weight_importance: f64,
    pub weight_vector: f64,
    pub weight_graph: f64,
    /// Entity expansion: look at mentions of the top `entity_expansion_multiplier * limit` candidates.
    pub entity_expansion_multiplier: usize,
    pub entity_min_cooccurrence: u32,
    pub entity_expansion_max_per_entity: usize,
    pub entity_expansion_score_multiplier: f64,
    /// Bond traversal max depth (phase 6).
    pub bond_traversal_max_depth: u32,
    pub bond_traversal_depth_decay: f64,
    pub recall_timeout_ms: u64,
    /// When true, use the legacy `0.995^hours` recency variant documented
    /// in spec.md §9 instead of the canonical `1/(1+ageHours/24)` form.
    pub legacy_recency: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_limit: 5,
            max_limit: 50,
            default_min_decay: 0.1,
            candidate_overfetch_factor: 3,
            vector_k_multiplier: 3,
            weight_recency: 0.5,
            weight_relevance: 3.0,
            weight_importance: 2.0,
            weight_vector: 3.0,
            weight_graph: 1.5,
            entity_expansion_multiplier: 2,
            entity_min_cooccurrence: 2,
            entity_expansion_max_per_entity: 3,
            entity_expansion_score_multiplier: 0.7,
            bond_traversal_max_depth: 2,
            bond_traversal_depth_decay: 0.8,
            recall_timeout_ms: 15_000,
            legacy_recency: false,
        }
    }
}
