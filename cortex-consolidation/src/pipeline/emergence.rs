//! Phase 5: Emergence (spec.md §4.8). Synthesizes an introspective note
//! over everything the earlier phases produced this cycle and, if wired,
//! hands it to the caller's `onEmergence` callback.

use chrono::Utc;
use serde_json::json;

use cortex_core::errors::CortexResult;
use cortex_core::memory::{compute_hash_id, MemoryKind, MemoryRecord};
use cortex_core::traits::{KVStore, LanguageModel};

use crate::pipeline::{truncate_summary, PhaseOutcome};

pub async fn run<S: KVStore, L: LanguageModel>(
    store: &S,
    llm: &L,
    produced_ids: &[i64],
    on_emergence: Option<&(dyn Fn(&str) -> CortexResult<()> + Send + Sync)>,
) -> CortexResult<PhaseOutcome> {
    let mut produced = Vec::with_capacity(produced_ids.len());
    for &id in produced_ids {
        if let Some(record) = store.get_record(id).await? {
            produced.push(record);
        }
    }
    let examined = produced.len() as u64;

    let prompt = if produced.is_empty() {
        "No new memories were produced this dream cycle. Offer a brief introspective note on the current state.".to_string()
    } else {
        let bullets: Vec<String> = produced.iter().map(|r| format!("- {}", r.summary)).collect();
        format!(
            "Reflect introspectively on what emerged this dream cycle from these new memories:\n{}",
            bullets.join("\n")
        )
    };
    let synthesis = llm.complete(&prompt).await?;

    let now = Utc::now();
    let summary = truncate_summary(&synthesis);
    let hash_id = compute_hash_id(MemoryKind::SelfModel, &summary, now);
    let record = MemoryRecord {
        id: 0,
        hash_id,
        kind: MemoryKind::SelfModel,
        content: synthesis.clone(),
        summary,
        tags: vec!["emergence".to_string()],
        concepts: vec![],
        valence: 0.0,
        importance: 0.7,
        access_count: 0,
        source: "dream:emergence".to_string(),
        source_id: None,
        owner_id: None,
        wallet_id: None,
        metadata: json!({}),
        created_at: now,
        last_accessed: now,
        decay_factor: 1.0,
        evidence_ids: produced.iter().map(|r| r.hash_id.clone()).collect(),
        external_signature: None,
        compacted: false,
        compacted_into: None,
        embedding: None,
    };
    let new_id = store.insert_record(record).await?;

    if let Some(callback) = on_emergence {
        if let Err(e) = callback(&synthesis) {
            tracing::warn!(error = %e, "onEmergence callback failed");
        }
    }

    Ok(PhaseOutcome {
        input_ids: produced_ids.to_vec(),
        output: synthesis,
        new_record_ids: vec![new_id],
        records_examined: examined,
        records_affected: 1,
    })
}
