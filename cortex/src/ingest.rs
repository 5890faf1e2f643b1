//! The write pipeline (spec.md §4.2): normalise an inbound observation,
//! score its importance, embed it, derive its content-addressed id,
//! classify concepts, persist it, and — without blocking the caller —
//! extract entities, auto-link it, and emit `memory:stored`.

use std::sync::OnceLock;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::json;
use sha2::{Digest, Sha256};

use cortex_core::errors::{CortexError, CortexResult, StorageError};
use cortex_core::memory::{
    compute_hash_id, concept_lexicon, importance_hints, CandidateQuery, MemoryRecord, Observation,
    MAX_CONTENT_CHARS, MAX_SUMMARY_CHARS,
};
use cortex_core::traits::{CommitSink, Embedder, EventSink, KVStore, LanguageModel};
use cortex_graph::{AssociationLinker, EntityExtractor};

use crate::events::EventBus;

fn whale_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bwhale").unwrap())
}

fn exit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bexit").unwrap())
}

fn ath_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bath\b").unwrap())
}

/// Deterministic importance rule table (spec.md §4.2 step 2's fallback
/// path): a floor plus additive hints, clamped to `[0, 1]`.
fn rule_based_importance(summary: &str, first_interaction: bool) -> f64 {
    let mut score = 0.4_f64;
    if whale_re().is_match(summary) {
        score += 0.3;
    }
    if exit_re().is_match(summary) {
        score += 0.25;
    }
    if ath_re().is_match(summary) {
        score += 0.15;
    }
    if first_interaction {
        score += 0.1;
    }
    score.clamp(0.0, 1.0)
}

/// Pulls the first floating-point number out of free text, for parsing an
/// LLM's `scoreImportance` response (spec.md §6 treats this as a single
/// free-text capability call rather than a typed RPC).
fn parse_leading_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let mut end = 0;
    let bytes = trimmed.as_bytes();
    while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
        end += 1;
    }
    trimmed[..end].parse::<f64>().ok()
}

fn clamp_chars(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        s.chars().take(max).collect()
    } else {
        s.to_string()
    }
}

/// Concept classification (spec.md §4.2 step 5): scan summary, source, and
/// tags against the static lexicon, shared with the public `inferConcepts`
/// operation (spec.md §6).
pub fn infer_concepts(summary: &str, source: &str, tags: &[String]) -> Vec<String> {
    let haystack = format!("{summary} {source} {}", tags.join(" ")).to_lowercase();
    concept_lexicon()
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| haystack.contains(kw)))
        .map(|(concept, _)| concept.to_string())
        .collect()
}

fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Outcome of a `store` call: whether the record was freshly inserted (and
/// its importance, for the caller's cumulative-importance dream trigger)
/// or resolved to an existing one by hash-id dedup.
#[derive(Debug, Clone, Copy)]
pub enum StoreOutcome {
    Inserted { id: i64, importance: f64 },
    Deduplicated { id: i64 },
}

impl StoreOutcome {
    pub fn id(&self) -> i64 {
        match self {
            StoreOutcome::Inserted { id, .. } => *id,
            StoreOutcome::Deduplicated { id } => *id,
        }
    }
}

/// Runs the seven-step ingest pipeline ahead of an insert, plus the
/// detached extraction/linking step that follows it.
pub struct Ingestor {
    entity_extractor: Arc<EntityExtractor>,
    association_linker: Arc<AssociationLinker>,
}

impl Ingestor {
    pub fn new(entity_extractor: EntityExtractor, association_linker: AssociationLinker) -> Self {
        Self {
            entity_extractor: Arc::new(entity_extractor),
            association_linker: Arc::new(association_linker),
        }
    }

    /// Steps 1-6 synchronously; step 7 (extraction, linking, the
    /// `memory:stored` event) runs detached so `store` returns without
    /// waiting on it (spec.md §4.2: "MUST return within bounded time even
    /// if step 7 has not completed").
    #[allow(clippy::too_many_arguments)]
    pub async fn store<S, E, L, C, V>(
        &self,
        store: &Arc<S>,
        embedder: Option<&Arc<E>>,
        language_model: Option<&Arc<L>>,
        commit_sink: Option<&Arc<C>>,
        events: &Arc<EventBus>,
        event_sink: Option<&Arc<V>>,
        now: DateTime<Utc>,
        observation: Observation,
    ) -> CortexResult<StoreOutcome>
    where
        S: KVStore + Send + Sync + 'static,
        E: Embedder + Send + Sync + 'static,
        L: LanguageModel + Send + Sync + 'static,
        C: CommitSink + Send + Sync + 'static,
        V: EventSink + Send + Sync + 'static,
    {
        if observation.content.trim().is_empty() {
            return Err(CortexError::ValidationError("content must not be empty".to_string()));
        }

        // Step 1: clamp.
        let content = clamp_chars(&observation.content, MAX_CONTENT_CHARS);
        let summary = clamp_chars(observation.summary.as_deref().unwrap_or(&content), MAX_SUMMARY_CHARS);

        // Step 2: importance.
        let importance = match observation.importance {
            Some(value) => value.clamp(0.0, 1.0),
            None => {
                let first_interaction = match &observation.owner_id {
                    Some(owner_id) => store
                        .query_candidates(&CandidateQuery {
                            owner_id: Some(owner_id.clone()),
                            limit: Some(1),
                            ..Default::default()
                        })
                        .await?
                        .is_empty(),
                    None => false,
                };
                self.score_importance(language_model, &summary, first_interaction).await
            }
        };

        // Step 3: embedding.
        let embedding = match embedder {
            Some(embedder) => embedder.embed(&content).await.ok(),
            None => None,
        };

        // Step 4: hash id.
        let hash_id = compute_hash_id(observation.kind, &summary, now);

        // Step 5: concepts.
        let tags = observation.tags.clone().unwrap_or_default();
        let concepts = infer_concepts(&summary, &observation.source, &tags);

        let external_signature = match commit_sink {
            Some(sink) => match sink.commit(&hash_id, &content).await {
                Ok(receipt) if receipt.committed => Some(receipt.signature),
                _ => Some(sha256_hex(&content)),
            },
            None => Some(sha256_hex(&content)),
        };

        let mut record = MemoryRecord {
            id: 0,
            hash_id: hash_id.clone(),
            kind: observation.kind,
            content,
            summary,
            tags,
            concepts,
            valence: observation.valence.unwrap_or(0.0),
            importance,
            access_count: 0,
            source: observation.source,
            source_id: observation.source_id,
            owner_id: observation.owner_id,
            wallet_id: observation.wallet_id,
            metadata: observation.metadata.unwrap_or_else(|| json!({})),
            created_at: now,
            last_accessed: now,
            decay_factor: 1.0,
            evidence_ids: observation.evidence_ids.unwrap_or_default(),
            external_signature,
            compacted: false,
            compacted_into: None,
            embedding,
        };
        record.clamp_invariants();

        // Step 6: insert, deduplicating on the store's hash-id rejection.
        let id = match store.insert_record(record).await {
            Ok(id) => id,
            Err(CortexError::StorageError(StorageError::Conflict { existing_id, .. })) => {
                return Ok(StoreOutcome::Deduplicated { id: existing_id });
            }
            Err(CortexError::Conflict { existing_id: Some(existing_id), .. }) => {
                return Ok(StoreOutcome::Deduplicated { id: existing_id });
            }
            Err(e) => return Err(e),
        };

        // Step 7: detached extraction, linking, event emission.
        let extractor = Arc::clone(&self.entity_extractor);
        let linker = Arc::clone(&self.association_linker);
        let detached_store = Arc::clone(store);
        let detached_events = Arc::clone(events);
        let detached_sink = event_sink.map(Arc::clone);
        let detached_hash_id = hash_id;
        tokio::spawn(async move {
            let Ok(Some(record)) = detached_store.get_record(id).await else {
                tracing::warn!(record_id = id, "post-insert fetch failed, skipping auto-linking");
                return;
            };
            if let Err(e) = extractor.process(detached_store.as_ref(), &record).await {
                tracing::warn!(record_id = id, error = %e, "entity extraction failed");
            }
            if let Err(e) = linker.link(detached_store.as_ref(), &record).await {
                tracing::warn!(record_id = id, error = %e, "association linking failed");
            }
            let event = cortex_core::traits::CortexEvent {
                kind: "memory:stored".to_string(),
                at: Utc::now(),
                payload: json!({ "id": id, "hash_id": detached_hash_id }),
            };
            if let Err(e) = detached_events.emit(detached_sink.as_deref(), event).await {
                tracing::warn!(record_id = id, error = %e, "memory:stored event emission failed");
            }
        });

        Ok(StoreOutcome::Inserted { id, importance })
    }

    async fn score_importance<L: LanguageModel>(
        &self,
        language_model: Option<&Arc<L>>,
        summary: &str,
        first_interaction: bool,
    ) -> f64 {
        if let Some(llm) = language_model {
            let hints = importance_hints();
            let prompt = format!(
                "Score the importance of this memory on a scale from 0 to 1. \
                 Respond with only the number.\nSummary: {summary}\n\
                 High-signal keywords: {:?}\nLow-signal keywords: {:?}",
                hints.high, hints.low
            );
            if let Ok(response) = llm.complete(&prompt).await {
                if let Some(score) = parse_leading_number(&response) {
                    return score.clamp(0.0, 1.0);
                }
            }
        }
        rule_based_importance(summary, first_interaction)
    }
}
