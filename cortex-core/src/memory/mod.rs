//! The Cortex data model (spec.md §3): memory records, bonds, entities,
//! mentions, entity relations, and dream logs, plus the request/response
//! shapes (`Observation`, `CandidateQuery`, `RecallSpec`) the other crates
//! pass across their boundaries.

mod bond;
mod dream_log;
mod entity;
mod hash;
mod lexicon;
mod observation;
mod query;
mod record;

pub use bond::{Bond, BondDirection, BondKind};
pub use dream_log::{DreamLog, DreamSessionKind};
pub use entity::{Entity, EntityKind, EntityRelation, Mention};
pub use hash::compute_hash_id;
pub use lexicon::{concept_lexicon, importance_hints, ImportanceHints};
pub use observation::Observation;
pub use query::{CandidateQuery, RecallSpec};
pub use record::{MemoryKind, MemoryRecord, RecordPatch, MAX_CONTENT_CHARS, MAX_SUMMARY_CHARS};
