//! # cortex
//!
//! The public facade (spec.md §6) over the persistence, graph, decay, and
//! consolidation subsystems: a single handle an agent runtime constructs
//! once, injecting whatever capabilities (embedder, language model, commit
//! sink, event sink, clock) it has, and leaving absent by passing the
//! no-op implementations in [`capabilities`].

pub mod capabilities;
mod events;
mod format;
mod ingest;
mod scheduler;
mod stats;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tokio::sync::Mutex as AsyncMutex;

use cortex_consolidation::DreamEngine;
pub use cortex_consolidation::DreamCycleReport;
use cortex_core::config::CortexConfig;
use cortex_core::errors::{CortexError, CortexResult};
use cortex_core::memory::{Bond, BondKind, MemoryKind, MemoryRecord, Observation};
pub use cortex_core::memory::RecallSpec;
use cortex_core::traits::{Clock, CommitSink, CortexEvent, Embedder, EventSink, KVStore, LanguageModel, SystemClock};
pub use cortex_core::Cancellation;
use cortex_decay::{DecayContext, DecayEngine};
pub use cortex_decay::DecayReport;
use cortex_graph::{AssociationLinker, EntityExtractor};
use cortex_retrieval::RecallEngine;
pub use cortex_retrieval::{MemorySummary, ScoredRecord};

pub use events::EventBus;
pub use ingest::StoreOutcome;
pub use scheduler::DreamScheduler;
pub use stats::CortexStats;

/// Persistent, decaying, graph-structured memory for an autonomous agent
/// (spec.md §1-§2). Generic over its injected capabilities because none of
/// them are object-safe (native `async fn` in trait position); construct
/// one with [`capabilities::NoopEmbedder`] etc. for any capability you
/// don't have.
pub struct Cortex<S, E, L, C, V, K = SystemClock> {
    store: Arc<S>,
    embedder: Option<Arc<E>>,
    language_model: Option<Arc<L>>,
    commit_sink: Option<Arc<C>>,
    event_sink: Option<Arc<V>>,
    clock: Arc<K>,
    config: CortexConfig,
    ingestor: Arc<ingest::Ingestor>,
    recall_engine: Arc<RecallEngine>,
    decay_engine: Arc<DecayEngine>,
    dream_engine: Arc<DreamEngine>,
    events: Arc<EventBus>,
    scheduler: std::sync::Mutex<DreamScheduler>,
    cumulative_importance: Arc<AsyncMutex<f64>>,
    dream_cycles_run: Arc<AtomicU64>,
}

impl<S, E, L, C, V, K> Cortex<S, E, L, C, V, K>
where
    S: KVStore + Send + Sync + 'static,
    E: Embedder + Send + Sync + 'static,
    L: LanguageModel + Send + Sync + 'static,
    C: CommitSink + Send + Sync + 'static,
    V: EventSink + Send + Sync + 'static,
    K: Clock + Send + Sync + 'static,
{
    pub fn new(
        config: CortexConfig,
        store: S,
        embedder: Option<E>,
        language_model: Option<L>,
        commit_sink: Option<C>,
        event_sink: Option<V>,
        clock: K,
    ) -> Self {
        let ingestor = ingest::Ingestor::new(
            EntityExtractor::new(config.graph.clone()),
            AssociationLinker::new(config.graph.clone()),
        );
        Self {
            store: Arc::new(store),
            embedder: embedder.map(Arc::new),
            language_model: language_model.map(Arc::new),
            commit_sink: commit_sink.map(Arc::new),
            event_sink: event_sink.map(Arc::new),
            clock: Arc::new(clock),
            recall_engine: Arc::new(RecallEngine::new(config.retrieval.clone())),
            decay_engine: Arc::new(DecayEngine::new()),
            dream_engine: Arc::new(DreamEngine::new(config.consolidation.clone())),
            ingestor: Arc::new(ingestor),
            events: Arc::new(EventBus::new()),
            scheduler: std::sync::Mutex::new(DreamScheduler::new()),
            cumulative_importance: Arc::new(AsyncMutex::new(0.0)),
            dream_cycles_run: Arc::new(AtomicU64::new(0)),
            config,
        }
    }

    /// Confirms the store is reachable. Schema materialization itself
    /// happens once, at store construction (`SqliteStore::open` runs
    /// migrations) — this call is idempotent and side-effect free on a
    /// healthy store.
    pub async fn init(&self) -> CortexResult<()> {
        self.store.fetch_recent(0, None, 0).await?;
        Ok(())
    }

    /// Runs the ingest pipeline (spec.md §4.2). Returns `Ok(None)` rather
    /// than an error when the observation fails validation or dedups by
    /// content hash (spec.md §7: "store returns null... without raising"),
    /// except that a hash-id dedup surfaces as `StoreOutcome::Deduplicated`
    /// so callers can still see which existing record it resolved to.
    pub async fn store(&self, observation: Observation) -> CortexResult<Option<StoreOutcome>> {
        let now = self.clock.now();
        match self
            .ingestor
            .store(
                &self.store,
                self.embedder.as_ref(),
                self.language_model.as_ref(),
                self.commit_sink.as_ref(),
                &self.events,
                self.event_sink.as_ref(),
                now,
                observation,
            )
            .await
        {
            Ok(outcome) => {
                if let StoreOutcome::Inserted { importance, .. } = outcome {
                    self.accumulate_importance(importance).await;
                }
                Ok(Some(outcome))
            }
            Err(e) if e.is_swallowed_by_store() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Full scored recall (spec.md §4.5), hydrated and Hebbian-reinforced.
    /// `cancellation` lets a caller abandon the call early (spec.md §5,
    /// scenario S6): on cancellation, no reinforcement has occurred
    /// because the recall future itself is dropped before it can spawn it.
    pub async fn recall(
        &self,
        spec: &RecallSpec,
        cancellation: Option<&Cancellation>,
    ) -> CortexResult<Vec<ScoredRecord>> {
        let recall_future = self.recall_engine.recall(&self.store, self.embedder.as_ref(), spec);
        match cancellation {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(CortexError::Cancelled),
                    result = recall_future => result,
                }
            }
            None => recall_future.await,
        }
    }

    /// Same ranking as `recall`, content-free and without reinforcement
    /// (spec.md §4.5's progressive disclosure).
    pub async fn recall_summaries(&self, spec: &RecallSpec) -> CortexResult<Vec<MemorySummary>> {
        self.recall_engine.recall_summaries(self.store.as_ref(), self.embedder.as_deref(), spec).await
    }

    /// Fetches full records for explicit ids (spec.md §4.5's `hydrate`).
    pub async fn hydrate(&self, ids: &[i64]) -> CortexResult<Vec<MemoryRecord>> {
        self.recall_engine.hydrate(self.store.as_ref(), ids).await
    }

    /// Creates or strengthens a bond between two records (spec.md §4.4).
    /// Idempotent: inserting the same ordered pair and kind again replaces
    /// the strength rather than duplicating the edge.
    pub async fn link(&self, source_id: i64, target_id: i64, kind: BondKind, strength: Option<f64>) -> CortexResult<()> {
        let bond = Bond::new(source_id, target_id, kind, strength.unwrap_or_else(|| kind.base_weight()));
        self.store.insert_bond(bond).await
    }

    /// Runs one decay pass over every non-compacted record (spec.md §4.7),
    /// pinned to this `Cortex`'s injected clock rather than wall-clock time.
    pub async fn decay(&self) -> CortexResult<DecayReport> {
        let ctx = DecayContext::new(self.clock.now(), self.config.decay.clone());
        self.decay_engine.run(self.store.as_ref(), &ctx).await
    }

    /// Runs one dream cycle to completion (spec.md §4.8) and resets the
    /// cumulative-importance trigger.
    pub async fn dream(
        &self,
        on_emergence: Option<&(dyn Fn(&str) -> CortexResult<()> + Send + Sync)>,
    ) -> CortexResult<DreamCycleReport> {
        let report = self.dream_engine.run_cycle(self.store.as_ref(), self.language_model.as_deref(), on_emergence).await?;
        self.dream_cycles_run.fetch_add(1, Ordering::SeqCst);
        *self.cumulative_importance.lock().await = 0.0;
        self.emit_dream_completed(&report).await;
        Ok(report)
    }

    /// Whether a dream cycle is currently running on this handle.
    pub fn is_dreaming(&self) -> bool {
        self.dream_engine.is_running()
    }

    /// Per-kind counts, mean decay factor, and dream-cycle history length
    /// (spec.md §6's `stats`).
    pub async fn stats(&self) -> CortexResult<CortexStats> {
        stats::compute_stats(self.store.as_ref(), self.dream_cycles_run.load(Ordering::SeqCst)).await
    }

    /// Records created within the last `window_hours` (spec.md §6's `recent`).
    pub async fn recent(&self, window_hours: i64, kinds: Option<&[MemoryKind]>, limit: usize) -> CortexResult<Vec<MemoryRecord>> {
        stats::recent(self.store.as_ref(), window_hours, kinds, limit).await
    }

    /// The agent's accumulated self-knowledge (spec.md §6's `selfModel`).
    pub async fn self_model(&self, limit: usize) -> CortexResult<Vec<MemoryRecord>> {
        stats::self_model(self.store.as_ref(), limit).await
    }

    /// Classifies `summary`/`source`/`tags` against the static concept
    /// lexicon (spec.md §6's `inferConcepts`), the same classification
    /// `store` runs internally.
    pub fn infer_concepts(&self, summary: &str, source: &str, tags: &[String]) -> Vec<String> {
        ingest::infer_concepts(summary, source, tags)
    }

    /// Renders a markdown context block from a recall result (spec.md §6's
    /// `formatContext`), using this `Cortex`'s clock for relative ages.
    pub fn format_context(&self, memories: &[MemoryRecord]) -> String {
        format::format_context_at(memories, self.clock.now())
    }

    /// Registers an in-process event handler (spec.md §6's `on`). `"*"`
    /// matches every event kind.
    pub fn on(&self, event: &str, handler: impl Fn(&CortexEvent) + Send + Sync + 'static) {
        self.events.on(event, handler);
    }

    /// Stops any running schedules and drops every registered event
    /// handler (spec.md §6's `destroy`).
    pub fn destroy(&self) {
        self.scheduler.lock().unwrap().stop_all();
        self.events.clear();
    }

    /// Starts the periodic dream cycle (spec.md §4.8: every
    /// `consolidation.cycle_interval_hours`). Requires an `Arc<Cortex>`
    /// since the scheduled task outlives the call that started it.
    pub fn start_dream_schedule(self: &Arc<Self>) {
        let interval_hours = self.config.consolidation.cycle_interval_hours;
        let cortex = Arc::clone(self);
        let tick: scheduler::BoxedTick = Box::new(move || {
            let cortex = Arc::clone(&cortex);
            Box::pin(async move {
                if let Err(e) = cortex.dream(None).await {
                    tracing::warn!(error = %e, "scheduled dream cycle failed");
                }
            })
        });
        self.scheduler.lock().unwrap().start_dream_schedule(interval_hours, tick);
    }

    pub fn stop_dream_schedule(&self) {
        self.scheduler.lock().unwrap().stop_dream_schedule();
    }

    /// Starts the daily decay sweep, aligned to 03:00 UTC (spec.md §4.8).
    pub fn start_decay_schedule(self: &Arc<Self>) {
        let cortex = Arc::clone(self);
        let tick: scheduler::BoxedTick = Box::new(move || {
            let cortex = Arc::clone(&cortex);
            Box::pin(async move {
                if let Err(e) = cortex.decay().await {
                    tracing::warn!(error = %e, "scheduled decay run failed");
                }
            })
        });
        self.scheduler.lock().unwrap().start_decay_schedule(tick);
    }

    pub fn stop_decay_schedule(&self) {
        self.scheduler.lock().unwrap().stop_decay_schedule();
    }

    async fn emit_dream_completed(&self, report: &DreamCycleReport) {
        let event = CortexEvent {
            kind: "dream:completed".to_string(),
            at: self.clock.now(),
            payload: json!({ "phases": report.phases.len(), "short_circuited": report.short_circuited }),
        };
        if let Err(e) = self.events.emit(self.event_sink.as_deref(), event).await {
            tracing::warn!(error = %e, "dream:completed event emission failed");
        }
    }

    /// Adds to the running total of importance scores for records stored
    /// since the last cycle; past the configured threshold, triggers a
    /// dream cycle on a detached task (spec.md §4.8) so `store` itself
    /// never blocks on one.
    async fn accumulate_importance(&self, importance: f64) {
        let mut total = self.cumulative_importance.lock().await;
        *total += importance;
        if *total < self.config.consolidation.importance_trigger_threshold {
            return;
        }
        *total = 0.0;
        drop(total);

        let store = Arc::clone(&self.store);
        let language_model = self.language_model.clone();
        let dream_engine = Arc::clone(&self.dream_engine);
        let events = Arc::clone(&self.events);
        let event_sink = self.event_sink.clone();
        let dream_cycles_run = Arc::clone(&self.dream_cycles_run);
        tokio::spawn(async move {
            match dream_engine.run_cycle(store.as_ref(), language_model.as_deref(), None).await {
                Ok(report) => {
                    dream_cycles_run.fetch_add(1, Ordering::SeqCst);
                    let event = CortexEvent {
                        kind: "dream:completed".to_string(),
                        at: Utc::now(),
                        payload: json!({
                            "trigger": "cumulative_importance",
                            "phases": report.phases.len(),
                            "short_circuited": report.short_circuited,
                        }),
                    };
                    if let Err(e) = events.emit(event_sink.as_deref(), event).await {
                        tracing::warn!(error = %e, "dream:completed event emission failed");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "importance-triggered dream cycle failed"),
            }
        });
    }
}
