use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which phase of the consolidation cycle produced a `DreamLog` entry
/// (spec.md §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DreamSessionKind {
    Consolidation,
    Compaction,
    Reflection,
    Contradiction,
    Emergence,
}

impl DreamSessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DreamSessionKind::Consolidation => "consolidation",
            DreamSessionKind::Compaction => "compaction",
            DreamSessionKind::Reflection => "reflection",
            DreamSessionKind::Contradiction => "contradiction",
            DreamSessionKind::Emergence => "emergence",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "consolidation" => Some(DreamSessionKind::Consolidation),
            "compaction" => Some(DreamSessionKind::Compaction),
            "reflection" => Some(DreamSessionKind::Reflection),
            "contradiction" => Some(DreamSessionKind::Contradiction),
            "emergence" => Some(DreamSessionKind::Emergence),
            _ => None,
        }
    }
}

/// An immutable record of one dream-cycle phase (spec.md §3): which
/// records went in, what the phase produced, and which records came out.
/// `records_examined`/`records_affected`/`started_at`/`finished_at` are
/// ambient audit fields beyond the spec's minimal shape, in the style of
/// the teacher's other audit-log tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DreamLog {
    pub id: i64,
    pub session_id: String,
    pub kind: DreamSessionKind,
    pub input_memory_ids: Vec<i64>,
    pub output: String,
    pub new_memory_ids: Vec<i64>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub records_examined: u64,
    pub records_affected: u64,
    pub summary: Option<String>,
    pub details: Value,
}
