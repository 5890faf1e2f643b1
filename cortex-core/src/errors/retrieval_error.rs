/// Errors from the recall / scoring pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("recall exceeded its time budget")]
    Timeout,

    #[error("recall was cancelled")]
    Cancelled,

    #[error("invalid query spec: {0}")]
    InvalidSpec(String),
}
