mod capability_error;
mod consolidation_error;
mod cortex_error;
mod graph_error;
mod retrieval_error;
mod storage_error;

pub use capability_error::CapabilityError;
pub use consolidation_error::ConsolidationError;
pub use cortex_error::{CortexError, CortexResult};
pub use graph_error::GraphError;
pub use retrieval_error::RetrievalError;
pub use storage_error::StorageError;
