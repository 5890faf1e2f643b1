use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use cortex_core::config::RetrievalConfig;
use cortex_core::errors::CortexResult;
use cortex_core::memory::{BondDirection, CandidateQuery, MemoryKind, MemoryRecord, RecallSpec};
use cortex_core::traits::{Embedder, KVStore};

use crate::reinforcement::Reinforcer;
use crate::scoring;

/// One ranked result: the full record plus its final composite score.
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub record: MemoryRecord,
    pub score: f64,
}

/// A content-free projection of a [`ScoredRecord`], returned by
/// `recallSummaries` (spec.md §4.5).
#[derive(Debug, Clone)]
pub struct MemorySummary {
    pub id: i64,
    pub hash_id: String,
    pub kind: MemoryKind,
    pub summary: String,
    pub tags: Vec<String>,
    pub concepts: Vec<String>,
    pub valence: f64,
    pub importance: f64,
    pub decay_factor: f64,
    pub created_at: DateTime<Utc>,
    pub score: f64,
}

impl From<&ScoredRecord> for MemorySummary {
    fn from(scored: &ScoredRecord) -> Self {
        Self {
            id: scored.record.id,
            hash_id: scored.record.hash_id.clone(),
            kind: scored.record.kind,
            summary: scored.record.summary.clone(),
            tags: scored.record.tags.clone(),
            concepts: scored.record.concepts.clone(),
            valence: scored.record.valence,
            importance: scored.record.importance,
            decay_factor: scored.record.decay_factor,
            created_at: scored.record.created_at,
            score: scored.score,
        }
    }
}

/// Implements the six-phase hybrid recall pipeline (spec.md §4.5).
pub struct RecallEngine {
    config: RetrievalConfig,
}

impl RecallEngine {
    pub fn new(config: RetrievalConfig) -> Self {
        Self { config }
    }

    /// Full recall: scores candidates, then fires reinforcement
    /// (spec.md §4.6) on a detached task so it cannot block this call.
    /// Takes `Arc` handles so the reinforcement task can outlive the call.
    pub async fn recall<S, E>(
        &self,
        store: &Arc<S>,
        embedder: Option<&Arc<E>>,
        spec: &RecallSpec,
    ) -> CortexResult<Vec<ScoredRecord>>
    where
        S: KVStore + Send + Sync + 'static,
        E: Embedder + Send + Sync + 'static,
    {
        let scored = self
            .score_candidates(store.as_ref(), embedder.map(|e| e.as_ref()), spec)
            .await?;

        let ids: Vec<i64> = scored.iter().map(|s| s.record.id).collect();
        if !ids.is_empty() {
            let reinforce_store = Arc::clone(store);
            tokio::spawn(async move {
                if let Err(e) = Reinforcer::new().reinforce(reinforce_store.as_ref(), &ids).await {
                    tracing::warn!(error = %e, "reinforcement failed after recall");
                }
            });
        }

        Ok(scored)
    }

    /// Same ranking as `recall`, without content and without the
    /// reinforcement side effect (spec.md §4.5 progressive disclosure).
    pub async fn recall_summaries<S, E>(
        &self,
        store: &S,
        embedder: Option<&E>,
        spec: &RecallSpec,
    ) -> CortexResult<Vec<MemorySummary>>
    where
        S: KVStore,
        E: Embedder,
    {
        let scored = self.score_candidates(store, embedder, spec).await?;
        Ok(scored.iter().map(MemorySummary::from).collect())
    }

    /// Fetches full content for explicit ids (spec.md §4.5's `hydrate`).
    pub async fn hydrate<S: KVStore>(&self, store: &S, ids: &[i64]) -> CortexResult<Vec<MemoryRecord>> {
        let mut out = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(record) = store.get_record(id).await? {
                out.push(record);
            }
        }
        Ok(out)
    }

    async fn score_candidates<S, E>(
        &self,
        store: &S,
        embedder: Option<&E>,
        spec: &RecallSpec,
    ) -> CortexResult<Vec<ScoredRecord>>
    where
        S: KVStore,
        E: Embedder,
    {
        let limit = spec
            .limit
            .unwrap_or(self.config.default_limit)
            .min(self.config.max_limit)
            .max(1);
        let min_decay = spec.min_decay.unwrap_or(self.config.default_min_decay);

        let vector_scores = self.vector_phase(store, embedder, spec, limit, min_decay).await?;

        let candidate_query = CandidateQuery {
            kinds: spec.kinds.clone(),
            tags: spec.tags.clone(),
            owner_id: spec.owner_id.clone(),
            wallet_id: spec.wallet_id.clone(),
            min_decay: Some(min_decay),
            min_importance: spec.min_importance,
            created_after: None,
            created_before: None,
            limit: Some(limit * self.config.candidate_overfetch_factor),
        };
        let metadata_candidates = store.query_candidates(&candidate_query).await?;

        let mut merged: HashMap<i64, MemoryRecord> = HashMap::new();
        for record in metadata_candidates {
            merged.insert(record.id, record);
        }
        for &id in vector_scores.keys() {
            if !merged.contains_key(&id) {
                if let Some(record) = store.get_record(id).await? {
                    merged.insert(id, record);
                }
            }
        }

        let now = Utc::now();
        let query_words = scoring::query_words(spec.query_text.as_deref());
        let requested_tags = spec.tags.clone().unwrap_or_default();

        let mut scored: Vec<ScoredRecord> = merged
            .into_values()
            .filter(|record| !record.compacted)
            .map(|record| {
                let vector_score = vector_scores.get(&record.id).copied().unwrap_or(0.0);
                let score = self.score_one(&record, now, &query_words, &requested_tags, vector_score, 0.0);
                ScoredRecord { record, score }
            })
            .collect();

        scored.sort_by(Self::rank_cmp);

        if spec.expand_entities {
            self.expand_entities(store, &mut scored, limit, now).await?;
            scored.sort_by(Self::rank_cmp);
        }

        if spec.expand_bonds {
            self.traverse_bonds(store, &mut scored, limit).await?;
            scored.sort_by(Self::rank_cmp);
        }

        scored.truncate(limit);
        Ok(scored)
    }

    async fn vector_phase<S: KVStore, E: Embedder>(
        &self,
        store: &S,
        embedder: Option<&E>,
        spec: &RecallSpec,
        limit: usize,
        min_decay: f64,
    ) -> CortexResult<HashMap<i64, f64>> {
        let mut vector_scores = HashMap::new();
        let Some(embedder) = embedder else {
            return Ok(vector_scores);
        };

        let query_embedding = if let Some(embedding) = &spec.query_embedding {
            Some(embedding.clone())
        } else {
            match &spec.query_text {
                Some(text) if !text.trim().is_empty() => Some(embedder.embed(text).await?),
                _ => None,
            }
        };

        if let Some(embedding) = query_embedding {
            let k = self.config.vector_k_multiplier * limit;
            for (id, similarity) in store.vector_search(&embedding, k, min_decay).await? {
                vector_scores.insert(id, similarity);
            }
        }

        Ok(vector_scores)
    }

    fn score_one(
        &self,
        record: &MemoryRecord,
        now: DateTime<Utc>,
        query_words: &[String],
        requested_tags: &[String],
        vector_score: f64,
        graph_boost: f64,
    ) -> f64 {
        let recency = scoring::recency(scoring::age_hours(record.created_at, now), self.config.legacy_recency);
        let relevance = scoring::relevance(query_words, &record.summary);
        let tag_score = scoring::tag_score(requested_tags, &record.tags);
        scoring::composite_score(
            &self.config,
            recency,
            relevance,
            record.importance,
            vector_score,
            graph_boost,
            record.decay_factor,
            tag_score,
        )
    }

    fn rank_cmp(a: &ScoredRecord, b: &ScoredRecord) -> Ordering {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.record.created_at.cmp(&a.record.created_at))
            .then_with(|| a.record.id.cmp(&b.record.id))
    }

    /// Phase 5 (spec.md §4.5): for each of the top `2*limit` candidates,
    /// pull its mentioned entities, find co-occurring entities above the
    /// threshold, and fold in a handful of their highest-importance
    /// records at a reduced score.
    async fn expand_entities<S: KVStore>(
        &self,
        store: &S,
        scored: &mut Vec<ScoredRecord>,
        limit: usize,
        now: DateTime<Utc>,
    ) -> CortexResult<()> {
        let top_n = (self.config.entity_expansion_multiplier * limit).min(scored.len());
        let mut seen: HashSet<i64> = scored.iter().map(|s| s.record.id).collect();
        let mut additions = Vec::new();

        for candidate in scored.iter().take(top_n) {
            let mentions = store.mentions_for_record(candidate.record.id).await?;
            for mention in mentions {
                let cooccurring = store.cooccurring_entities(mention.entity_id).await?;
                for (other_entity, count) in cooccurring {
                    if count < self.config.entity_min_cooccurrence as u64 {
                        continue;
                    }
                    let record_ids = store.record_ids_for_entity(other_entity).await?;
                    let mut extra = Vec::new();
                    for id in record_ids {
                        if seen.contains(&id) {
                            continue;
                        }
                        if let Some(record) = store.get_record(id).await? {
                            if !record.compacted {
                                extra.push(record);
                            }
                        }
                    }
                    extra.sort_by(|a, b| b.importance.partial_cmp(&a.importance).unwrap_or(Ordering::Equal));
                    extra.truncate(self.config.entity_expansion_max_per_entity);

                    for record in extra {
                        if seen.insert(record.id) {
                            let score = self.score_one(&record, now, &[], &[], 0.0, 0.0)
                                * self.config.entity_expansion_score_multiplier;
                            additions.push(ScoredRecord { record, score });
                        }
                    }
                }
            }
        }

        scored.extend(additions);
        Ok(())
    }

    /// Phase 6 (spec.md §4.5): walk outgoing bonds from the top `limit`
    /// candidates in traversal-priority order, depth-bounded and
    /// visited-gated, adding `graphBoost = strength * depthDecay^depth` to
    /// any record reached and re-scoring it.
    async fn traverse_bonds<S: KVStore>(
        &self,
        store: &S,
        scored: &mut Vec<ScoredRecord>,
        limit: usize,
    ) -> CortexResult<()> {
        let seeds: Vec<i64> = scored.iter().take(limit).map(|s| s.record.id).collect();
        // Visited tracks traversal-reached ids, seeded with the start set
        // only to block a bond pointing straight back at its own origin;
        // records already present in `scored` still receive a graph boost
        // the first time a bond lands on them.
        let mut visited: HashSet<i64> = seeds.iter().copied().collect();
        let mut boosts: HashMap<i64, f64> = HashMap::new();
        let mut frontier = seeds;

        for depth in 1..=self.config.bond_traversal_max_depth {
            let mut next_frontier = Vec::new();
            for record_id in frontier {
                let mut bonds = store.list_bonds(record_id, BondDirection::Outgoing).await?;
                bonds.sort_by_key(|b| b.kind.traversal_priority());
                for bond in bonds {
                    if visited.contains(&bond.target_id) {
                        continue;
                    }
                    visited.insert(bond.target_id);
                    let boost = bond.strength * self.config.bond_traversal_depth_decay.powi(depth as i32);
                    *boosts.entry(bond.target_id).or_insert(0.0) += boost;
                    next_frontier.push(bond.target_id);
                }
            }
            if next_frontier.is_empty() {
                break;
            }
            frontier = next_frontier;
        }

        for (id, boost) in &boosts {
            if let Some(scored_record) = scored.iter_mut().find(|s| s.record.id == *id) {
                scored_record.score += self.config.weight_graph * boost * scored_record.record.decay_factor;
                continue;
            }
            if let Some(record) = store.get_record(*id).await? {
                if record.compacted {
                    continue;
                }
                let now = Utc::now();
                let score = self.score_one(&record, now, &[], &[], 0.0, *boost);
                scored.push(ScoredRecord { record, score });
            }
        }

        Ok(())
    }
}
