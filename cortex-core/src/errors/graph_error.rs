/// Errors from entity extraction, association linking, and bond graph writes.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("entity not found: {id}")]
    EntityNotFound { id: i64 },

    #[error("invalid bond: {source_id} -> {target_id} ({kind})")]
    InvalidBond {
        source_id: i64,
        target_id: i64,
        kind: String,
    },

    #[error("extraction pattern error: {0}")]
    PatternError(String),
}
