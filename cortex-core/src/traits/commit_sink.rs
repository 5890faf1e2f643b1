use serde::{Deserialize, Serialize};

use crate::errors::CortexResult;

/// Receipt returned by an external commit capability (spec.md §9). When no
/// `CommitSink` is configured, or a call to one fails, callers fall back to
/// `sha256(content)` hex as the record's `external_signature` rather than
/// leaving it unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitReceipt {
    pub signature: String,
    pub committed: bool,
}

/// An external, tamper-evident commit capability for a memory record's
/// content (spec.md §9). Not required for correctness of recall or decay;
/// purely an integrity/audit collaborator.
#[allow(async_fn_in_trait)]
pub trait CommitSink: Send + Sync {
    async fn commit(&self, hash_id: &str, content: &str) -> CortexResult<CommitReceipt>;
}
