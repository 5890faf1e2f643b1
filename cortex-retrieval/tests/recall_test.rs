use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use cortex_core::errors::CortexResult;
use cortex_core::memory::{Bond, BondKind, MemoryKind, MemoryRecord, RecallSpec};
use cortex_core::traits::{Embedder, KVStore};
use cortex_retrieval::RecallEngine;
use cortex_storage::SqliteStore;

struct NullEmbedder;

impl Embedder for NullEmbedder {
    async fn embed(&self, _text: &str) -> CortexResult<Vec<f32>> {
        Ok(vec![0.0; 4])
    }
    async fn embed_batch(&self, texts: &[String]) -> CortexResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![0.0; 4]).collect())
    }
    fn dimensions(&self) -> usize {
        4
    }
}

fn sample_record(hash_id: &str, summary: &str, importance: f64) -> MemoryRecord {
    let now = Utc::now();
    MemoryRecord {
        id: 0,
        hash_id: hash_id.to_string(),
        kind: MemoryKind::Episodic,
        content: summary.to_string(),
        summary: summary.to_string(),
        tags: vec![],
        concepts: vec![],
        valence: 0.0,
        importance,
        access_count: 0,
        source: "test".to_string(),
        source_id: None,
        owner_id: None,
        wallet_id: None,
        metadata: json!({}),
        created_at: now,
        last_accessed: now,
        decay_factor: 1.0,
        evidence_ids: vec![],
        external_signature: None,
        compacted: false,
        compacted_into: None,
        embedding: None,
    }
}

#[tokio::test]
async fn recall_ranks_higher_importance_first() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    store.insert_record(sample_record("clude-r0000001", "a note about rust", 0.2)).await.unwrap();
    store.insert_record(sample_record("clude-r0000002", "a note about rust", 0.9)).await.unwrap();

    let engine = RecallEngine::new(Default::default());
    let spec = RecallSpec { expand_entities: false, expand_bonds: false, ..Default::default() };
    let results = engine.recall(&store, None::<&Arc<NullEmbedder>>, &spec).await.unwrap();

    assert!(results.len() >= 2);
    assert_eq!(results[0].record.hash_id, "clude-r0000002");
}

#[tokio::test]
async fn recall_applies_reinforcement_eventually() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let id = store.insert_record(sample_record("clude-r0000003", "reinforced note", 0.5)).await.unwrap();

    let engine = RecallEngine::new(Default::default());
    let spec = RecallSpec { expand_entities: false, expand_bonds: false, ..Default::default() };
    let results = engine.recall(&store, None::<&Arc<NullEmbedder>>, &spec).await.unwrap();
    assert!(!results.is_empty());

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let reinforced = store.get_record(id).await.unwrap().unwrap();
    assert_eq!(reinforced.access_count, 1);
}

#[tokio::test]
async fn recall_summaries_strips_content_and_does_not_reinforce() {
    let store = SqliteStore::open_in_memory().unwrap();
    let id = store.insert_record(sample_record("clude-r0000004", "a summary only", 0.5)).await.unwrap();

    let engine = RecallEngine::new(Default::default());
    let spec = RecallSpec { expand_entities: false, expand_bonds: false, ..Default::default() };
    let summaries = engine.recall_summaries(&store, None::<&NullEmbedder>, &spec).await.unwrap();
    assert!(summaries.iter().any(|s| s.id == id));

    let record = store.get_record(id).await.unwrap().unwrap();
    assert_eq!(record.access_count, 0);
}

#[tokio::test]
async fn bond_traversal_adds_graph_boost_to_connected_record() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let a = store.insert_record(sample_record("clude-r0000005", "seed record about finance", 0.8)).await.unwrap();
    let b = store.insert_record(sample_record("clude-r0000006", "unrelated filler", 0.1)).await.unwrap();
    store.insert_bond(Bond::new(a, b, BondKind::Causes, 0.9)).await.unwrap();

    let engine = RecallEngine::new(Default::default());
    let spec = RecallSpec {
        limit: Some(1),
        expand_entities: false,
        expand_bonds: true,
        ..Default::default()
    };
    let results = engine.recall(&store, None::<&Arc<NullEmbedder>>, &spec).await.unwrap();
    assert!(results.iter().any(|r| r.record.id == b));
}
