//! Introspection operations (spec.md §6): `stats`, `recent`, `selfModel`,
//! `inferConcepts`. Shape mirrors the teacher's per-subsystem health
//! report pattern (a fixed top-level struct wrapping per-category
//! figures), trimmed to the categories this engine actually has.

use cortex_core::errors::CortexResult;
use cortex_core::memory::{CandidateQuery, MemoryKind, MemoryRecord};
use cortex_core::traits::KVStore;

pub use crate::ingest::infer_concepts;

/// Count and mean decay factor for one `MemoryKind`.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct KindStats {
    pub kind: MemoryKind,
    pub count: usize,
    pub mean_decay_factor: f64,
}

/// Snapshot returned by `Cortex::stats` (spec.md §6).
#[derive(Debug, Clone, serde::Serialize)]
pub struct CortexStats {
    pub by_kind: Vec<KindStats>,
    pub total_records: usize,
    pub dream_cycles_run: u64,
}

const ALL_KINDS: [MemoryKind; 4] =
    [MemoryKind::Episodic, MemoryKind::Semantic, MemoryKind::Procedural, MemoryKind::SelfModel];

/// Scans every record once per kind to report counts and mean decay
/// (spec.md §6's `stats`). `dream_cycles_run` is supplied by the caller,
/// since the store has no durable count of completed dream cycles.
pub async fn compute_stats<S: KVStore>(store: &S, dream_cycles_run: u64) -> CortexResult<CortexStats> {
    let mut by_kind = Vec::with_capacity(ALL_KINDS.len());
    let mut total_records = 0;

    for kind in ALL_KINDS {
        let records = store
            .query_candidates(&CandidateQuery { kinds: Some(vec![kind]), ..Default::default() })
            .await?;
        let count = records.len();
        let mean_decay_factor = if count == 0 {
            0.0
        } else {
            records.iter().map(|r| r.decay_factor).sum::<f64>() / count as f64
        };
        total_records += count;
        by_kind.push(KindStats { kind, count, mean_decay_factor });
    }

    Ok(CortexStats { by_kind, total_records, dream_cycles_run })
}

/// Records created within the last `window_hours`, optionally restricted
/// to a set of kinds (spec.md §6's `recent`).
pub async fn recent<S: KVStore>(
    store: &S,
    window_hours: i64,
    kinds: Option<&[MemoryKind]>,
    limit: usize,
) -> CortexResult<Vec<MemoryRecord>> {
    store.fetch_recent(window_hours, kinds, limit).await
}

/// The agent's accumulated self-knowledge (spec.md §6's `selfModel`):
/// every `self_model` record, most recent first.
pub async fn self_model<S: KVStore>(store: &S, limit: usize) -> CortexResult<Vec<MemoryRecord>> {
    let mut records = store
        .query_candidates(&CandidateQuery { kinds: Some(vec![MemoryKind::SelfModel]), ..Default::default() })
        .await?;
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    records.truncate(limit);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_storage::SqliteStore;
    use serde_json::json;

    async fn store_episodic(store: &SqliteStore, summary: &str, created_at: chrono::DateTime<chrono::Utc>) {
        let hash_id = cortex_core::memory::compute_hash_id(MemoryKind::Episodic, summary, created_at);
        let mut record = cortex_core::memory::MemoryRecord {
            id: 0,
            hash_id,
            kind: MemoryKind::Episodic,
            content: summary.to_string(),
            summary: summary.to_string(),
            tags: vec![],
            concepts: vec![],
            valence: 0.0,
            importance: 0.5,
            access_count: 0,
            source: "test".to_string(),
            source_id: None,
            owner_id: None,
            wallet_id: None,
            metadata: json!({}),
            created_at,
            last_accessed: created_at,
            decay_factor: 1.0,
            evidence_ids: vec![],
            external_signature: None,
            compacted: false,
            compacted_into: None,
            embedding: None,
        };
        record.clamp_invariants();
        store.insert_record(record).await.unwrap();
    }

    #[tokio::test]
    async fn stats_counts_and_averages_per_kind() {
        let store = SqliteStore::open_in_memory().unwrap();
        let now = chrono::Utc::now();
        store_episodic(&store, "first memory", now).await;
        store_episodic(&store, "second memory", now + chrono::Duration::seconds(1)).await;

        let stats = compute_stats(&store, 0).await.unwrap();
        let episodic = stats.by_kind.iter().find(|k| k.kind == MemoryKind::Episodic).unwrap();
        assert_eq!(episodic.count, 2);
        assert_eq!(stats.total_records, 2);
    }
}
