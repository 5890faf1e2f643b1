//! Phase 3: Reflection (spec.md §4.8). Asks the language model for a
//! handful of self-observations grounded in the current self-model and
//! recent semantic memories. Only invoked by the engine when a language
//! model capability is present.

use chrono::Utc;
use serde_json::json;

use cortex_core::config::ConsolidationConfig;
use cortex_core::errors::CortexResult;
use cortex_core::memory::{compute_hash_id, Bond, BondKind, CandidateQuery, MemoryKind, MemoryRecord};
use cortex_core::traits::{KVStore, LanguageModel};

use crate::pipeline::{truncate_summary, PhaseOutcome, PHASE_SCAN_LIMIT};

pub async fn run<S: KVStore, L: LanguageModel>(
    store: &S,
    llm: &L,
    config: &ConsolidationConfig,
) -> CortexResult<PhaseOutcome> {
    let mut context_records = store
        .query_candidates(&CandidateQuery {
            kinds: Some(vec![MemoryKind::SelfModel]),
            limit: Some(PHASE_SCAN_LIMIT),
            ..Default::default()
        })
        .await?;
    let recent_semantic = store
        .fetch_recent(config.reflection_window_hours, Some(&[MemoryKind::Semantic]), PHASE_SCAN_LIMIT)
        .await?;
    let examined = (context_records.len() + recent_semantic.len()) as u64;
    context_records.extend(recent_semantic);

    if context_records.is_empty() {
        return Ok(PhaseOutcome { records_examined: examined, ..Default::default() });
    }

    let bullets: Vec<String> = context_records.iter().map(|r| format!("- [{}] {}", r.hash_id, r.summary)).collect();
    let prompt = format!(
        "Given the following self-model and recent semantic memories, produce between {} and {} concise self-observations, one per line, each grounded in the evidence below.\n{}",
        config.reflection_min_observations,
        config.reflection_max_observations,
        bullets.join("\n")
    );
    let response = llm.complete(&prompt).await?;

    let observations: Vec<String> = response
        .lines()
        .map(|line| line.trim().trim_start_matches('-').trim().to_string())
        .filter(|line| !line.is_empty())
        .take(config.reflection_max_observations)
        .collect();

    let evidence_ids: Vec<String> = context_records.iter().map(|r| r.hash_id.clone()).collect();
    let cited_ids: Vec<i64> = context_records.iter().map(|r| r.id).collect();
    let mut outcome = PhaseOutcome {
        records_examined: examined,
        input_ids: cited_ids.clone(),
        ..Default::default()
    };

    for observation in observations {
        let now = Utc::now();
        let summary = truncate_summary(&observation);
        let hash_id = compute_hash_id(MemoryKind::SelfModel, &summary, now);
        let record = MemoryRecord {
            id: 0,
            hash_id,
            kind: MemoryKind::SelfModel,
            content: observation.clone(),
            summary,
            tags: vec!["reflection".to_string()],
            concepts: vec![],
            valence: 0.0,
            importance: 0.6,
            access_count: 0,
            source: "dream:reflection".to_string(),
            source_id: None,
            owner_id: None,
            wallet_id: None,
            metadata: json!({}),
            created_at: now,
            last_accessed: now,
            decay_factor: 1.0,
            evidence_ids: evidence_ids.clone(),
            external_signature: None,
            compacted: false,
            compacted_into: None,
            embedding: None,
        };
        let new_id = store.insert_record(record).await?;

        for &cited in &cited_ids {
            store
                .insert_bond(Bond::new(new_id, cited, BondKind::Supports, BondKind::Supports.base_weight()))
                .await?;
        }

        outcome.new_record_ids.push(new_id);
        outcome.records_affected += 1;
        if !outcome.output.is_empty() {
            outcome.output.push('\n');
        }
        outcome.output.push_str(&observation);
    }

    Ok(outcome)
}
