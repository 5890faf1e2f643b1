use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CortexResult;

/// Lifecycle events the facade publishes as memories are stored, recalled,
/// reinforced, decayed, and consolidated (spec.md §4.9). A concrete
/// `EventSink` might forward these onto a message bus or just log them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CortexEvent {
    pub kind: String,
    pub at: DateTime<Utc>,
    pub payload: Value,
}

#[allow(async_fn_in_trait)]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: CortexEvent) -> CortexResult<()>;
}
