//! [`SqliteStore`]: the concrete [`KVStore`] implementation, backed by a
//! single write connection and a small read pool (spec.md §4.1, §5).

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::warn;

use cortex_core::config::StorageConfig;
use cortex_core::errors::{CortexResult, StorageError};
use cortex_core::memory::{
    Bond, BondDirection, BondKind, CandidateQuery, DreamLog, Entity, EntityKind, MemoryKind,
    MemoryRecord, Mention, RecordPatch,
};
use cortex_core::traits::KVStore;

use crate::migrations;
use crate::pool::{ReadPool, WriteConnection};
use crate::queries::{bond_ops, dream_log_ops, entity_ops, memory_crud, vector_search};

/// Either a dedicated read pool, or (for `:memory:` databases, where every
/// connection is an independent database) routing reads through the
/// writer.
enum Readers {
    Pool(ReadPool),
    Writer,
}

pub struct SqliteStore {
    writer: WriteConnection,
    readers: Readers,
    config: StorageConfig,
}

impl SqliteStore {
    /// Open (creating if absent) a file-backed store and apply migrations.
    pub fn open(config: StorageConfig) -> CortexResult<Self> {
        let mut writer_conn = rusqlite::Connection::open(&config.db_path)
            .map_err(|e| crate::to_storage_err(e.to_string()))?;
        migrations::run_migrations(&mut writer_conn)?;
        drop(writer_conn);

        let writer = WriteConnection::open(&config.db_path)?;
        let readers = if config.db_path == ":memory:" {
            Readers::Writer
        } else {
            Readers::Pool(ReadPool::open(&config.db_path, config.read_pool_size)?)
        };
        Ok(Self { writer, readers, config })
    }

    /// A fully in-memory store, matching the teacher's `open_in_memory()`
    /// convenience used throughout its test suite.
    pub fn open_in_memory() -> CortexResult<Self> {
        Self::open(StorageConfig {
            db_path: ":memory:".to_string(),
            ..Default::default()
        })
    }

    async fn with_read<T>(
        &self,
        f: impl FnOnce(&rusqlite::Connection) -> CortexResult<T>,
    ) -> CortexResult<T> {
        match &self.readers {
            Readers::Pool(pool) => pool.with_conn(f).await,
            Readers::Writer => self.writer.with_conn(f).await,
        }
    }

    /// Retry a write up to `max_retries` times with the configured
    /// exponential backoff (spec.md §4.1: transient errors retried
    /// 100ms/400ms/1600ms, unavailability surfaced as `StoreUnavailable`).
    async fn with_write_retry<T>(
        &self,
        f: impl Fn(&rusqlite::Connection) -> CortexResult<T>,
    ) -> CortexResult<T> {
        let mut attempt = 0u32;
        loop {
            let result = self.writer.with_conn(|conn| f(conn)).await;
            match result {
                Ok(v) => return Ok(v),
                Err(e) if is_transient(&e) && attempt < self.config.max_retries => {
                    let backoff = self
                        .config
                        .retry_backoff_ms
                        .get(attempt as usize)
                        .copied()
                        .unwrap_or(1_600);
                    warn!(attempt, backoff, "retrying transient storage error");
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                    attempt += 1;
                }
                Err(e) if is_transient(&e) => {
                    return Err(StorageError::Unavailable {
                        attempts: attempt,
                        message: e.to_string(),
                    }
                    .into());
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn is_transient(err: &cortex_core::CortexError) -> bool {
    matches!(
        err,
        cortex_core::CortexError::StorageError(StorageError::SqliteError { .. })
    )
}

#[allow(async_fn_in_trait)]
impl KVStore for SqliteStore {
    async fn insert_record(&self, record: MemoryRecord) -> CortexResult<i64> {
        self.with_write_retry(move |conn| memory_crud::insert_record(conn, &record))
            .await
    }

    async fn update_record(&self, id: i64, patch: RecordPatch) -> CortexResult<()> {
        self.with_write_retry(move |conn| memory_crud::update_record(conn, id, &patch))
            .await
    }

    async fn get_record(&self, id: i64) -> CortexResult<Option<MemoryRecord>> {
        self.with_read(move |conn| memory_crud::get_record(conn, id)).await
    }

    async fn get_record_by_hash(&self, hash_id: &str) -> CortexResult<Option<MemoryRecord>> {
        let hash_id = hash_id.to_string();
        self.with_read(move |conn| memory_crud::get_by_hash(conn, &hash_id)).await
    }

    async fn fetch_recent(
        &self,
        window_hours: i64,
        kinds: Option<&[MemoryKind]>,
        limit: usize,
    ) -> CortexResult<Vec<MemoryRecord>> {
        let kinds = kinds.map(|k| k.to_vec());
        self.with_read(move |conn| memory_crud::fetch_recent(conn, window_hours, kinds.as_deref(), limit))
            .await
    }

    async fn query_candidates(&self, spec: &CandidateQuery) -> CortexResult<Vec<MemoryRecord>> {
        let spec = spec.clone();
        self.with_read(move |conn| memory_crud::query_candidates(conn, &spec)).await
    }

    async fn vector_search(
        &self,
        query_embedding: &[f32],
        k: usize,
        min_decay: f64,
    ) -> CortexResult<Vec<(i64, f64)>> {
        let query_embedding = query_embedding.to_vec();
        self.with_read(move |conn| vector_search::vector_search(conn, &query_embedding, k, min_decay))
            .await
    }

    async fn insert_bond(&self, bond: Bond) -> CortexResult<()> {
        self.with_write_retry(move |conn| bond_ops::insert_bond(conn, &bond)).await
    }

    async fn update_bond(&self, bond: Bond) -> CortexResult<()> {
        self.with_write_retry(move |conn| bond_ops::update_bond(conn, &bond)).await
    }

    async fn list_bonds(&self, record_id: i64, direction: BondDirection) -> CortexResult<Vec<Bond>> {
        self.with_read(move |conn| bond_ops::list_bonds(conn, record_id, direction)).await
    }

    async fn list_bonds_by_kind(&self, kind: BondKind) -> CortexResult<Vec<Bond>> {
        self.with_read(move |conn| bond_ops::list_bonds_by_kind(conn, kind)).await
    }

    async fn upsert_entity(
        &self,
        kind: EntityKind,
        canonical_name: &str,
        normalized_name: &str,
    ) -> CortexResult<(i64, bool)> {
        let canonical_name = canonical_name.to_string();
        let normalized_name = normalized_name.to_string();
        self.with_write_retry(move |conn| {
            entity_ops::upsert_entity(conn, kind, &canonical_name, &normalized_name)
        })
        .await
    }

    async fn get_entity(&self, id: i64) -> CortexResult<Option<Entity>> {
        self.with_read(move |conn| entity_ops::get_entity(conn, id)).await
    }

    async fn increment_entity_mention(&self, id: i64, at: DateTime<Utc>) -> CortexResult<()> {
        self.with_write_retry(move |conn| entity_ops::increment_entity_mention(conn, id, at))
            .await
    }

    async fn insert_mention(&self, mention: Mention) -> CortexResult<()> {
        self.with_write_retry(move |conn| entity_ops::insert_mention(conn, &mention)).await
    }

    async fn mentions_for_record(&self, record_id: i64) -> CortexResult<Vec<Mention>> {
        self.with_read(move |conn| entity_ops::mentions_for_record(conn, record_id)).await
    }

    async fn record_ids_for_entity(&self, entity_id: i64) -> CortexResult<Vec<i64>> {
        self.with_read(move |conn| entity_ops::record_ids_for_entity(conn, entity_id)).await
    }

    async fn record_cooccurrence(&self, a: i64, b: i64) -> CortexResult<()> {
        self.with_write_retry(move |conn| entity_ops::record_cooccurrence(conn, a, b)).await
    }

    async fn cooccurrence_count(&self, a: i64, b: i64) -> CortexResult<u64> {
        self.with_read(move |conn| entity_ops::cooccurrence_count(conn, a, b)).await
    }

    async fn cooccurring_entities(&self, entity_id: i64) -> CortexResult<Vec<(i64, u64)>> {
        self.with_read(move |conn| entity_ops::cooccurring_entities(conn, entity_id)).await
    }

    async fn insert_dream_log(&self, log: DreamLog) -> CortexResult<i64> {
        self.with_write_retry(move |conn| dream_log_ops::insert_dream_log(conn, &log)).await
    }

    async fn finish_dream_log(
        &self,
        id: i64,
        finished_at: DateTime<Utc>,
        records_examined: u64,
        records_affected: u64,
        summary: Option<String>,
    ) -> CortexResult<()> {
        self.with_write_retry(move |conn| {
            dream_log_ops::finish_dream_log(conn, id, finished_at, records_examined, records_affected, summary.clone())
        })
        .await
    }
}
