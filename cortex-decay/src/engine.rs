use chrono::{DateTime, Utc};

use cortex_core::errors::CortexResult;
use cortex_core::memory::{CandidateQuery, MemoryKind, MemoryRecord, RecordPatch};
use cortex_core::traits::KVStore;

use crate::context::DecayContext;

/// Summary of one decay pass (spec.md §4.7), returned by `decay()` on the
/// facade.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct DecayReport {
    pub records_examined: u64,
    pub records_decayed: u64,
}

/// Applies spec.md §4.7's per-kind daily decay to memory records. The pure
/// `decay_one`/`process_batch` functions take no store dependency and run
/// fast over large batches; `run` drives the periodic task end to end
/// against a [`KVStore`].
#[derive(Debug, Clone, Default)]
pub struct DecayEngine;

impl DecayEngine {
    pub fn new() -> Self {
        Self
    }

    fn daily_rate(kind: MemoryKind, ctx: &DecayContext) -> f64 {
        match kind {
            MemoryKind::Episodic => ctx.config.episodic_daily_rate,
            MemoryKind::Semantic => ctx.config.semantic_daily_rate,
            MemoryKind::Procedural => ctx.config.procedural_daily_rate,
            MemoryKind::SelfModel => ctx.config.self_model_daily_rate,
        }
    }

    /// Returns the record's new `decayFactor`, or `None` if the record is
    /// compacted, not yet stale, or already at the floor (no-op per
    /// spec.md §9: "further decay is a no-op").
    pub fn decay_one(&self, record: &MemoryRecord, ctx: &DecayContext) -> Option<f64> {
        if record.compacted {
            return None;
        }
        if record.decay_factor <= ctx.config.floor {
            return None;
        }
        let hours_since_access = (ctx.now - record.last_accessed).num_seconds() as f64 / 3600.0;
        if hours_since_access < ctx.config.stale_after_hours as f64 {
            return None;
        }
        let days = hours_since_access / 24.0;
        let rate = Self::daily_rate(record.kind, ctx);
        let decayed = record.decay_factor * rate.powf(days);
        let floored = decayed.max(ctx.config.floor);
        if (floored - record.decay_factor).abs() < f64::EPSILON {
            None
        } else {
            Some(floored)
        }
    }

    /// Pure batch decay: computes `(id, new_decay_factor)` for every record
    /// whose factor actually changes. Does not touch a store — callers
    /// persist the results themselves. Mirrors the shape of a
    /// throughput-oriented batch benchmark: no I/O, no allocation beyond
    /// the output vector.
    pub fn process_batch(&self, records: &[MemoryRecord], ctx: &DecayContext) -> Vec<(i64, f64)> {
        records
            .iter()
            .filter_map(|r| self.decay_one(r, ctx).map(|factor| (r.id, factor)))
            .collect()
    }

    /// Runs one full decay pass against `store`: scans all non-compacted
    /// records, computes decayed factors, and writes changed ones back.
    pub async fn run(&self, store: &impl KVStore, ctx: &DecayContext) -> CortexResult<DecayReport> {
        let candidates = store
            .query_candidates(&CandidateQuery {
                limit: None,
                ..Default::default()
            })
            .await?;

        let examined = candidates.len() as u64;
        let changed = self.process_batch(&candidates, ctx);

        for (id, new_factor) in &changed {
            store
                .update_record(
                    *id,
                    RecordPatch {
                        decay_factor: Some(*new_factor),
                        ..Default::default()
                    },
                )
                .await?;
        }

        tracing::info!(examined, decayed = changed.len(), "decay pass complete");
        Ok(DecayReport { records_examined: examined, records_decayed: changed.len() as u64 })
    }
}

/// Age in whole days between two instants, used by compaction/reflection
/// eligibility checks elsewhere (spec.md §4.8 phases reference "7 days").
pub fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_seconds() as f64 / 86_400.0
}
