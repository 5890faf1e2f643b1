//! Phase 1: Consolidation (spec.md §4.8). Clusters recent episodic
//! records by shared concept and synthesizes an evidence-linked semantic
//! record per cluster.

use chrono::Utc;

use cortex_core::config::ConsolidationConfig;
use cortex_core::errors::CortexResult;
use cortex_core::memory::{compute_hash_id, Bond, BondKind, MemoryKind, MemoryRecord};
use cortex_core::traits::{KVStore, LanguageModel};

use crate::clustering;
use crate::pipeline::{average_importance, truncate_summary, PhaseOutcome, PHASE_SCAN_LIMIT};

pub async fn run<S: KVStore, L: LanguageModel>(
    store: &S,
    llm: Option<&L>,
    config: &ConsolidationConfig,
) -> CortexResult<PhaseOutcome> {
    let records = store
        .fetch_recent(config.consolidation_window_hours, Some(&[MemoryKind::Episodic]), PHASE_SCAN_LIMIT)
        .await?;
    let examined = records.len() as u64;
    let groups = clustering::group_by_dominant_concept(records);

    let mut outcome = PhaseOutcome { records_examined: examined, ..Default::default() };

    for (concept, members) in groups {
        if members.len() < config.consolidation_min_cluster_size {
            continue;
        }

        let member_ids: Vec<i64> = members.iter().map(|r| r.id).collect();
        let evidence_ids: Vec<String> = members.iter().map(|r| r.hash_id.clone()).collect();
        let synthesized = synthesize(llm, &concept, &members).await?;

        let now = Utc::now();
        let summary = truncate_summary(&synthesized);
        let hash_id = compute_hash_id(MemoryKind::Semantic, &summary, now);
        let new_record = MemoryRecord {
            id: 0,
            hash_id,
            kind: MemoryKind::Semantic,
            content: synthesized.clone(),
            summary,
            tags: vec![concept.clone()],
            concepts: vec![concept.clone()],
            valence: 0.0,
            importance: average_importance(&members),
            access_count: 0,
            source: "dream:consolidation".to_string(),
            source_id: None,
            owner_id: members[0].owner_id.clone(),
            wallet_id: members[0].wallet_id.clone(),
            metadata: serde_json::json!({ "cluster_size": members.len() }),
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
                .insert_bond(Bond::new(new_id, *member_id, BondKind::Supports, BondKind::Supports.base_weight()))
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

/// Poses the focal-point question via the language model when one is
/// available; otherwise falls back to a deterministic roll-up, since only
/// Reflection is gated on the LLM capability's presence (spec.md §4.8).
async fn synthesize<L: LanguageModel>(llm: Option<&L>, concept: &str, members: &[MemoryRecord]) -> CortexResult<String> {
    let bullets: Vec<String> = members.iter().map(|r| format!("- {}", r.summary)).collect();
    match llm {
        Some(llm) => {
            let prompt = format!(
                "The following {} episodic memories all relate to '{}'. Pose the focal-point question they jointly answer, then answer it in one or two sentences.\n{}",
                members.len(),
                concept,
                bullets.join("\n")
            );
            llm.complete(&prompt).await
        }
        None => Ok(format!(
            "Recurring theme '{}' across {} memories: {}",
            concept,
            members.len(),
            bullets.join(" ")
        )),
    }
}
