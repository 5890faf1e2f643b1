/// Errors from the dream cycle (consolidation, compaction, reflection,
/// contradiction resolution, emergence).
#[derive(Debug, thiserror::Error)]
pub enum ConsolidationError {
    #[error("a dream cycle is already in progress")]
    AlreadyRunning,

    #[error("phase {phase} failed: {reason}")]
    PhaseFailed { phase: String, reason: String },

    #[error("merge failed: {reason}")]
    MergeFailed { reason: String },

    #[error("reflection requires a language model capability")]
    ReflectionUnavailable,
}
