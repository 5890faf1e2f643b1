//! Phase 4: Contradiction Resolution (spec.md §4.8). Reconciles
//! unresolved `contradicts` bonds pairwise via the language model and
//! decays the weaker side of each pair.

use chrono::Utc;

use cortex_core::config::ConsolidationConfig;
use cortex_core::errors::CortexResult;
use cortex_core::memory::{compute_hash_id, Bond, BondDirection, BondKind, MemoryKind, MemoryRecord, RecordPatch};
use cortex_core::traits::{KVStore, LanguageModel};

use crate::pipeline::{truncate_summary, PhaseOutcome};

pub async fn run<S: KVStore, L: LanguageModel>(
    store: &S,
    llm: &L,
    config: &ConsolidationConfig,
) -> CortexResult<PhaseOutcome> {
    let contradictions = store.list_bonds_by_kind(BondKind::Contradicts).await?;
    let examined = contradictions.len() as u64;

    let mut outcome = PhaseOutcome { records_examined: examined, ..Default::default() };

    for bond in contradictions {
        if has_incident_resolution(store, bond.source_id).await? || has_incident_resolution(store, bond.target_id).await? {
            continue;
        }

        let (Some(a), Some(b)) = (store.get_record(bond.source_id).await?, store.get_record(bond.target_id).await?) else {
            continue;
        };

        let prompt = format!(
            "Record A says: '{}'. Record B says: '{}'. Reconcile these contradicting statements into one accurate belief.",
            a.content, b.content
        );
        let reconciled = llm.complete(&prompt).await?;

        let now = Utc::now();
        let summary = truncate_summary(&reconciled);
        let hash_id = compute_hash_id(MemoryKind::Semantic, &summary, now);
        let new_record = MemoryRecord {
            id: 0,
            hash_id,
            kind: MemoryKind::Semantic,
            content: reconciled.clone(),
            summary,
            tags: vec!["resolved".to_string()],
            concepts: vec![],
            valence: 0.0,
            importance: a.importance.max(b.importance),
            access_count: 0,
            source: "dream:contradiction".to_string(),
            source_id: None,
            owner_id: a.owner_id.clone(),
            wallet_id: a.wallet_id.clone(),
            metadata: serde_json::json!({}),
            created_at: now,
            last_accessed: now,
            decay_factor: 1.0,
            evidence_ids: vec![a.hash_id.clone(), b.hash_id.clone()],
            external_signature: None,
            compacted: false,
            compacted_into: None,
            embedding: None,
        };
        let new_id = store.insert_record(new_record).await?;
        store
            .insert_bond(Bond::new(new_id, a.id, BondKind::Resolves, BondKind::Resolves.base_weight()))
            .await?;
        store
            .insert_bond(Bond::new(new_id, b.id, BondKind::Resolves, BondKind::Resolves.base_weight()))
            .await?;

        let weaker = weaker_of(&a, &b);
        store
            .update_record(
                weaker.id,
                RecordPatch {
                    decay_factor: Some(weaker.decay_factor * config.contradiction_decay_multiplier),
                    ..Default::default()
                },
            )
            .await?;

        outcome.input_ids.push(a.id);
        outcome.input_ids.push(b.id);
        outcome.new_record_ids.push(new_id);
        outcome.records_affected += 2;
        if !outcome.output.is_empty() {
            outcome.output.push('\n');
        }
        outcome.output.push_str(&reconciled);
    }

    Ok(outcome)
}

async fn has_incident_resolution<S: KVStore>(store: &S, record_id: i64) -> CortexResult<bool> {
    let bonds = store.list_bonds(record_id, BondDirection::Both).await?;
    Ok(bonds.iter().any(|b| b.kind == BondKind::Resolves))
}

/// The side to weaken: lower importance wins; ties broken by age, older
/// being weaker (spec.md §4.8).
fn weaker_of<'a>(a: &'a MemoryRecord, b: &'a MemoryRecord) -> &'a MemoryRecord {
    if (a.importance - b.importance).abs() < f64::EPSILON {
        if a.created_at <= b.created_at {
            a
        } else {
            b
        }
    } else if a.importance < b.importance {
        a
    } else {
        b
    }
}
