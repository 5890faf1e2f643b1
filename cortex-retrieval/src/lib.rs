//! # cortex-retrieval
//!
//! The scored recall pipeline (spec.md §4.5) and Hebbian reinforcement
//! (spec.md §4.6): six phases from raw candidates to a ranked, bond-boosted
//! result set, followed by a non-blocking co-retrieval update.

mod recaller;
mod reinforcement;
mod scoring;

pub use recaller::{MemorySummary, RecallEngine, ScoredRecord};
pub use reinforcement::Reinforcer;
