//! The dream cycle state machine (spec.md §4.8):
//! `IDLE → CONSOLIDATION → COMPACTION → REFLECTION → CONTRADICTION →
//! EMERGENCE → IDLE`, with at most one cycle running per engine instance.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;

use cortex_core::config::ConsolidationConfig;
use cortex_core::errors::{ConsolidationError, CortexResult};
use cortex_core::memory::{DreamLog, DreamSessionKind};
use cortex_core::traits::{KVStore, LanguageModel};

use crate::pipeline::{self, PhaseOutcome};

/// What one phase of a cycle did, as logged to the store.
#[derive(Debug, Clone)]
pub struct PhaseReport {
    pub kind: DreamSessionKind,
    pub records_examined: u64,
    pub records_affected: u64,
    pub new_record_ids: Vec<i64>,
}

/// The outcome of a full dream cycle.
#[derive(Debug, Clone, Default)]
pub struct DreamCycleReport {
    pub phases: Vec<PhaseReport>,
    /// `true` when the cycle stopped after Compaction for want of a
    /// language model capability (spec.md §4.8).
    pub short_circuited: bool,
}

/// Runs the five dream phases under a single-execution guard. Cheap to
/// clone: the guard is reference-counted, so clones share one in-flight
/// cycle.
#[derive(Clone)]
pub struct DreamEngine {
    is_running: Arc<AtomicBool>,
    config: ConsolidationConfig,
}

impl DreamEngine {
    pub fn new(config: ConsolidationConfig) -> Self {
        Self { is_running: Arc::new(AtomicBool::new(false)), config }
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    /// Runs one full dream cycle. Concurrent calls while a cycle is
    /// already in progress fail with `ConsolidationError::AlreadyRunning`
    /// rather than queueing (spec.md §4.8: "concurrent triggers are
    /// coalesced" — the caller is expected to treat this as a no-op, not
    /// retry).
    pub async fn run_cycle<S, L>(
        &self,
        store: &S,
        llm: Option<&L>,
        on_emergence: Option<&(dyn Fn(&str) -> CortexResult<()> + Send + Sync)>,
    ) -> CortexResult<DreamCycleReport>
    where
        S: KVStore,
        L: LanguageModel,
    {
        if self
            .is_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ConsolidationError::AlreadyRunning.into());
        }

        let result = self.run_cycle_inner(store, llm, on_emergence).await;
        self.is_running.store(false, Ordering::SeqCst);
        result
    }

    async fn run_cycle_inner<S, L>(
        &self,
        store: &S,
        llm: Option<&L>,
        on_emergence: Option<&(dyn Fn(&str) -> CortexResult<()> + Send + Sync)>,
    ) -> CortexResult<DreamCycleReport>
    where
        S: KVStore,
        L: LanguageModel,
    {
        let mut report = DreamCycleReport::default();
        let mut produced_ids = Vec::new();

        let consolidation = pipeline::run_consolidation(store, llm, &self.config).await;
        let consolidation = self.log_phase(store, DreamSessionKind::Consolidation, consolidation).await?;
        produced_ids.extend(consolidation.new_record_ids.iter().copied());
        report.phases.push(consolidation);

        let compaction = pipeline::run_compaction(store, llm, &self.config).await;
        let compaction = self.log_phase(store, DreamSessionKind::Compaction, compaction).await?;
        produced_ids.extend(compaction.new_record_ids.iter().copied());
        report.phases.push(compaction);

        let Some(llm) = llm else {
            report.short_circuited = true;
            return Ok(report);
        };

        let reflection = pipeline::run_reflection(store, llm, &self.config).await;
        let reflection = self.log_phase(store, DreamSessionKind::Reflection, reflection).await?;
        produced_ids.extend(reflection.new_record_ids.iter().copied());
        report.phases.push(reflection);

        let contradiction = pipeline::run_contradiction(store, llm, &self.config).await;
        let contradiction = self.log_phase(store, DreamSessionKind::Contradiction, contradiction).await?;
        produced_ids.extend(contradiction.new_record_ids.iter().copied());
        report.phases.push(contradiction);

        let emergence = pipeline::run_emergence(store, llm, &produced_ids, on_emergence).await;
        let emergence = self.log_phase(store, DreamSessionKind::Emergence, emergence).await?;
        report.phases.push(emergence);

        Ok(report)
    }

    /// Records a phase's outcome as a `DreamLog` and turns it into a
    /// `PhaseReport`. A phase error is logged (not persisted, since there
    /// is no output to log) and propagated — the caller's cycle stops
    /// without rolling back phases already committed (spec.md §4.8).
    async fn log_phase<S: KVStore>(
        &self,
        store: &S,
        kind: DreamSessionKind,
        outcome: CortexResult<PhaseOutcome>,
    ) -> CortexResult<PhaseReport> {
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(phase = kind.as_str(), error = %e, "dream phase failed");
                return Err(e);
            }
        };

        let started_at = Utc::now();
        let log = DreamLog {
            id: 0,
            session_id: uuid::Uuid::new_v4().to_string(),
            kind,
            input_memory_ids: outcome.input_ids.clone(),
            output: outcome.output.clone(),
            new_memory_ids: outcome.new_record_ids.clone(),
            started_at,
            finished_at: None,
            records_examined: outcome.records_examined,
            records_affected: outcome.records_affected,
            summary: None,
            details: serde_json::json!({}),
        };
        let log_id = store.insert_dream_log(log).await?;
        store
            .finish_dream_log(log_id, Utc::now(), outcome.records_examined, outcome.records_affected, None)
            .await?;

        tracing::info!(
            phase = kind.as_str(),
            examined = outcome.records_examined,
            affected = outcome.records_affected,
            new_records = outcome.new_record_ids.len(),
            "dream phase complete"
        );

        Ok(PhaseReport {
            kind,
            records_examined: outcome.records_examined,
            records_affected: outcome.records_affected,
            new_record_ids: outcome.new_record_ids,
        })
    }
}
