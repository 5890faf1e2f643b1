use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::MemoryKind;

/// The shape an `Ingestor` accepts from a calling agent (spec.md §4.2).
/// Everything beyond `kind` and `content` is optional and filled in by
/// the ingest pipeline (concept inference, entity extraction, hashing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub kind: MemoryKind,
    pub content: String,
    pub summary: Option<String>,
    pub tags: Option<Vec<String>>,
    pub valence: Option<f64>,
    pub importance: Option<f64>,
    pub source: String,
    pub source_id: Option<String>,
    pub owner_id: Option<String>,
    pub wallet_id: Option<String>,
    pub metadata: Option<Value>,
    pub evidence_ids: Option<Vec<String>>,
}
