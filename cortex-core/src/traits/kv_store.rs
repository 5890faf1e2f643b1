use chrono::{DateTime, Utc};

use crate::errors::CortexResult;
use crate::memory::{
    Bond, BondDirection, BondKind, CandidateQuery, DreamLog, Entity, EntityKind, MemoryKind,
    MemoryRecord, Mention, RecordPatch,
};

/// The durable persistence capability (spec.md §4.1, §6): records, bonds,
/// entities, mentions, and dream logs, plus the indexed access patterns
/// the recall pipeline and dream cycle need. A concrete implementation
/// (`cortex-storage`'s `SqliteStore`) owns retry/backoff and timeout
/// behaviour; this trait only describes the operations.
#[allow(async_fn_in_trait)]
pub trait KVStore: Send + Sync {
    async fn insert_record(&self, record: MemoryRecord) -> CortexResult<i64>;
    async fn update_record(&self, id: i64, patch: RecordPatch) -> CortexResult<()>;
    async fn get_record(&self, id: i64) -> CortexResult<Option<MemoryRecord>>;
    async fn get_record_by_hash(&self, hash_id: &str) -> CortexResult<Option<MemoryRecord>>;
    async fn fetch_recent(
        &self,
        window_hours: i64,
        kinds: Option<&[MemoryKind]>,
        limit: usize,
    ) -> CortexResult<Vec<MemoryRecord>>;
    async fn query_candidates(&self, spec: &CandidateQuery) -> CortexResult<Vec<MemoryRecord>>;
    async fn vector_search(
        &self,
        query_embedding: &[f32],
        k: usize,
        min_decay: f64,
    ) -> CortexResult<Vec<(i64, f64)>>;

    async fn insert_bond(&self, bond: Bond) -> CortexResult<()>;
    async fn update_bond(&self, bond: Bond) -> CortexResult<()>;
    async fn list_bonds(&self, record_id: i64, direction: BondDirection) -> CortexResult<Vec<Bond>>;
    /// Every stored bond of a given kind, system-wide. Used by the dream
    /// cycle's contradiction-resolution phase to enumerate `contradicts`
    /// bonds without a starting record id (spec.md §4.8).
    async fn list_bonds_by_kind(&self, kind: BondKind) -> CortexResult<Vec<Bond>>;

    async fn upsert_entity(
        &self,
        kind: EntityKind,
        canonical_name: &str,
        normalized_name: &str,
    ) -> CortexResult<(i64, bool)>;
    async fn get_entity(&self, id: i64) -> CortexResult<Option<Entity>>;
    async fn increment_entity_mention(&self, id: i64, at: DateTime<Utc>) -> CortexResult<()>;
    async fn insert_mention(&self, mention: Mention) -> CortexResult<()>;
    async fn mentions_for_record(&self, record_id: i64) -> CortexResult<Vec<Mention>>;
    async fn record_ids_for_entity(&self, entity_id: i64) -> CortexResult<Vec<i64>>;
    async fn record_cooccurrence(&self, a: i64, b: i64) -> CortexResult<()>;
    async fn cooccurrence_count(&self, a: i64, b: i64) -> CortexResult<u64>;
    /// Every entity that has co-occurred with `entity_id` at least once,
    /// paired with its count. Used by recall phase 5 (spec.md §4.5) to find
    /// expansion candidates.
    async fn cooccurring_entities(&self, entity_id: i64) -> CortexResult<Vec<(i64, u64)>>;

    async fn insert_dream_log(&self, log: DreamLog) -> CortexResult<i64>;
    async fn finish_dream_log(
        &self,
        id: i64,
        finished_at: DateTime<Utc>,
        records_examined: u64,
        records_affected: u64,
        summary: Option<String>,
    ) -> CortexResult<()>;
}
