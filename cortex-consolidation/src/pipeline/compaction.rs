//! Phase 2: Compaction (spec.md §4.8). Rolls up stale, low-importance
//! episodic records into a single semantic summary per dominant concept.

use chrono::Utc;

use cortex_core::config::ConsolidationConfig;
use cortex_core::errors::CortexResult;
use cortex_core::memory::{compute_hash_id, Bond, BondKind, CandidateQuery, MemoryKind, MemoryRecord, RecordPatch};
use cortex_core::traits::{KVStore, LanguageModel};

use crate::clustering;
use crate::pipeline::{average_importance, truncate_summary, PhaseOutcome, PHASE_SCAN_LIMIT};

pub async fn run<S: KVStore, L: LanguageModel>(
    store: &S,
    llm: Option<&L>,
    config: &ConsolidationConfig,
) -> CortexResult<PhaseOutcome> {
    let cutoff = Utc::now() - chrono::Duration::days(config.compaction_min_age_days);
    let candidates = store
        .query_candidates(&CandidateQuery {
            kinds: Some(vec![MemoryKind::Episodic]),
            created_before: Some(cutoff),
            limit: Some(PHASE_SCAN_LIMIT),
            ..Default::default()
        })
        .await?;

    let examined = candidates.len() as u64;
    let eligible: Vec<MemoryRecord> = candidates
        .into_iter()
        .filter(|r| !r.compacted && r.decay_factor < config.compaction_max_decay && r.importance < config.compaction_max_importance)
        .collect();

    let groups = clustering::group_by_dominant_concept(eligible);
    let mut outcome = PhaseOutcome { records_examined: examined, ..Default::default() };

    for (concept, members) in groups {
        if members.is_empty() {
            continue;
        }

        let member_ids: Vec<i64> = members.iter().map(|r| r.id).collect();
        let evidence_ids: Vec<String> = members.iter().map(|r| r.hash_id.clone()).collect();
        let synthesized = synthesize(llm, &concept, &members).await?;

        let now = Utc::now();
        let summary = truncate_summary(&synthesized);
        let new_hash_id = compute_hash_id(MemoryKind::Semantic, &summary, now);
        let new_record = MemoryRecord {
            id: 0,
            hash_id: new_hash_id.clone(),
            kind: MemoryKind::Semantic,
            content: synthesized.clone(),
            summary,
            tags: vec![concept.clone()],
            concepts: vec![concept.clone()],
            valence: 0.0,
            importance: average_importance(&members),
            access_count: 0,
            source: "dream:compaction".to_string(),
            source_id: None,
            owner_id: members[0].owner_id.clone(),
            wallet_id: members[0].wallet_id.clone(),
            metadata: serde_json::json!({ "compacted_count": members.len() }),
            created_at: now,
            last_accessed: now,
            decay_factor: 1.0,
            evidence_ids,
            external_signature: None,
            compacted: false,
            compacted_into: None,
            embedding: None,
        };
        let new_id = store.insert_record(new_record).await?;

        for member_id in &member_ids {
            store
                .update_record(
                    *member_id,
                    RecordPatch {
                        compacted: Some(true),
                        compacted_into: Some(new_hash_id.clone()),
                        ..Default::default()
                    },
                )
                .await?;
            store
                .insert_bond(Bond::new(*member_id, new_id, BondKind::Elaborates, BondKind::Elaborates.base_weight()))
                .await?;
        }

        outcome.records_affected += member_ids.len() as u64;
        outcome.input_ids.extend(member_ids);
        outcome.new_record_ids.push(new_id);
        if !outcome.output.is_empty() {
            outcome.output.push('\n');
        }
        outcome.output.push_str(&synthesized);
    }

    Ok(outcome)
}

async fn synthesize<L: LanguageModel>(llm: Option<&L>, concept: &str, members: &[MemoryRecord]) -> CortexResult<String> {
    let bullets: Vec<String> = members.iter().map(|r| format!("- {}", r.summary)).collect();
    match llm {
        Some(llm) => {
            let prompt = format!(
                "Summarize these {} fading, low-importance memories about '{}' into one durable sentence.\n{}",
                members.len(),
                concept,
                bullets.join("\n")
            );
            llm.complete(&prompt).await
        }
        None => Ok(format!("Archived summary of '{}' ({} memories): {}", concept, members.len(), bullets.join(" "))),
    }
}
