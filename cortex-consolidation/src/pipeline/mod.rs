mod compaction;
mod consolidation;
mod contradiction;
mod emergence;
mod reflection;

pub use compaction::run as run_compaction;
pub use consolidation::run as run_consolidation;
pub use contradiction::run as run_contradiction;
pub use emergence::run as run_emergence;
pub use reflection::run as run_reflection;

/// What a single dream phase did, in a shape that maps directly onto a
/// [`cortex_core::memory::DreamLog`] (spec.md §4.8).
#[derive(Debug, Clone, Default)]
pub struct PhaseOutcome {
    pub input_ids: Vec<i64>,
    pub output: String,
    pub new_record_ids: Vec<i64>,
    pub records_examined: u64,
    pub records_affected: u64,
}

/// A scan ceiling for phases that otherwise have no natural upper bound
/// (spec.md doesn't cap phase input size; this keeps a single dream cycle
/// from attempting an unbounded table scan).
pub(crate) const PHASE_SCAN_LIMIT: usize = 10_000;

pub(crate) fn average_importance(records: &[cortex_core::memory::MemoryRecord]) -> f64 {
    if records.is_empty() {
        return 0.5;
    }
    records.iter().map(|r| r.importance).sum::<f64>() / records.len() as f64
}

pub(crate) fn truncate_summary(text: &str) -> String {
    text.chars().take(cortex_core::memory::MAX_SUMMARY_CHARS).collect()
}

