use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MAX_CONTENT_CHARS: usize = 5_000;
pub const MAX_SUMMARY_CHARS: usize = 500;
pub const MAX_TAGS: usize = 20;
pub const MIN_DECAY_FACTOR: f64 = 0.05;
pub const MAX_DECAY_FACTOR: f64 = 1.0;

/// The four memory kinds (spec.md §3, GLOSSARY), each with its own
/// decay rate in `cortex-decay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    Episodic,
    Semantic,
    Procedural,
    SelfModel,
}

impl MemoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryKind::Episodic => "episodic",
            MemoryKind::Semantic => "semantic",
            MemoryKind::Procedural => "procedural",
            MemoryKind::SelfModel => "self_model",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "episodic" => Some(MemoryKind::Episodic),
            "semantic" => Some(MemoryKind::Semantic),
            "procedural" => Some(MemoryKind::Procedural),
            "self_model" => Some(MemoryKind::SelfModel),
            _ => None,
        }
    }
}

/// A durable, typed memory record (spec.md §3).
///
/// Fields carrying a range invariant (`importance`, `valence`,
/// `decay_factor`) are clamped on construction and on every patch applied
/// through `MemoryRecord::clamp_invariants` — callers should never be able
/// to observe a record outside the documented ranges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Monotonic integer id, assigned by the store on insert.
    pub id: i64,
    /// Content-addressed id: `clude-<8 hex>`, immutable after creation.
    pub hash_id: String,
    pub kind: MemoryKind,
    pub content: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub concepts: Vec<String>,
    pub valence: f64,
    pub importance: f64,
    pub access_count: u64,
    pub source: String,
    pub source_id: Option<String>,
    pub owner_id: Option<String>,
    pub wallet_id: Option<String>,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub decay_factor: f64,
    /// Hash ids of records this one cites as evidence. May dangle if the
    /// referenced record was purged externally (spec.md §3 invariants).
    pub evidence_ids: Vec<String>,
    /// External commit signature, or its fallback per spec.md §9
    /// (`sha256(content)` hex when the commit sink is absent/failed).
    pub external_signature: Option<String>,
    pub compacted: bool,
    pub compacted_into: Option<String>,
    pub embedding: Option<Vec<f32>>,
}

impl MemoryRecord {
    /// Clamp all ranged fields into their documented bounds in place.
    pub fn clamp_invariants(&mut self) {
        self.importance = self.importance.clamp(0.0, 1.0);
        self.valence = self.valence.clamp(-1.0, 1.0);
        self.decay_factor = self.decay_factor.clamp(MIN_DECAY_FACTOR, MAX_DECAY_FACTOR);
        if self.content.chars().count() > MAX_CONTENT_CHARS {
            self.content = self.content.chars().take(MAX_CONTENT_CHARS).collect();
        }
        if self.summary.chars().count() > MAX_SUMMARY_CHARS {
            self.summary = self.summary.chars().take(MAX_SUMMARY_CHARS).collect();
        }
        if self.tags.len() > MAX_TAGS {
            self.tags.truncate(MAX_TAGS);
        }
        if self.last_accessed < self.created_at {
            self.last_accessed = self.created_at;
        }
    }
}

/// Partial update restricted to the fields spec.md §4.1 allows
/// `updateRecord` to touch.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub access_count: Option<u64>,
    pub last_accessed: Option<DateTime<Utc>>,
    pub decay_factor: Option<f64>,
    pub compacted: Option<bool>,
    pub compacted_into: Option<String>,
    pub external_signature: Option<String>,
    pub embedding: Option<Vec<f32>>,
}
