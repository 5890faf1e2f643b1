use serde::{Deserialize, Serialize};

/// Entity extraction and association-linking tunables (spec.md §4.3, §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub handle_salience: f64,
    pub wallet_salience: f64,
    pub token_salience: f64,
    pub proper_noun_salience: f64,
    pub concept_salience: f64,
    /// Top-k similar records considered for an embedding `relates` bond.
    pub similarity_top_k: usize,
    pub similarity_threshold: f64,
    pub max_tags: usize,
    pub max_evidence_ids: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            handle_salience: 0.7,
            wallet_salience: 0.9,
            token_salience: 0.85,
            proper_noun_salience: 0.6,
            concept_salience: 0.5,
            similarity_top_k: 5,
            similarity_threshold: 0.82,
            max_tags: 20,
            max_evidence_ids: 64,
        }
    }
}
