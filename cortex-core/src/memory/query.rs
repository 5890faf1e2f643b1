use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::MemoryKind;

/// Filter spec for `queryCandidates` (spec.md §4.1): a direct, unscored
/// lookup against the store, as opposed to `RecallSpec`'s scored recall.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateQuery {
    pub kinds: Option<Vec<MemoryKind>>,
    pub tags: Option<Vec<String>>,
    pub owner_id: Option<String>,
    pub wallet_id: Option<String>,
    pub min_decay: Option<f64>,
    pub min_importance: Option<f64>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

/// The scored-recall request (spec.md §4.5), consumed by the six-phase
/// recall pipeline in `cortex-retrieval`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecallSpec {
    pub query_text: Option<String>,
    pub query_embedding: Option<Vec<f32>>,
    pub kinds: Option<Vec<MemoryKind>>,
    pub tags: Option<Vec<String>>,
    pub owner_id: Option<String>,
    pub wallet_id: Option<String>,
    pub limit: Option<usize>,
    pub min_decay: Option<f64>,
    pub min_importance: Option<f64>,
    pub expand_entities: bool,
    pub expand_bonds: bool,
}

impl Default for RecallSpec {
    fn default() -> Self {
        Self {
            query_text: None,
            query_embedding: None,
            kinds: None,
            tags: None,
            owner_id: None,
            wallet_id: None,
            limit: None,
            min_decay: None,
            min_importance: None,
            expand_entities: true,
            expand_bonds: true,
        }
    }
}
