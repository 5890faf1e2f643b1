use chrono::{Duration, Utc};
use serde_json::json;

use cortex_core::memory::{MemoryKind, MemoryRecord};
use cortex_core::traits::KVStore;
use cortex_decay::{DecayContext, DecayEngine};
use cortex_storage::SqliteStore;

fn sample_record(hash_id: &str, kind: MemoryKind, last_accessed_days_ago: i64) -> MemoryRecord {
    let now = Utc::now();
    MemoryRecord {
        id: 0,
        hash_id: hash_id.to_string(),
        kind,
        content: "content".to_string(),
        summary: "content".to_string(),
        tags: vec![],
        concepts: vec![],
        valence: 0.0,
        importance: 0.5,
        access_count: 0,
        source: "test".to_string(),
        source_id: None,
        owner_id: None,
        wallet_id: None,
        metadata: json!({}),
        created_at: now - Duration::days(last_accessed_days_ago),
        last_accessed: now - Duration::days(last_accessed_days_ago),
        decay_factor: 1.0,
        evidence_ids: vec![],
        external_signature: None,
        compacted: false,
        compacted_into: None,
        embedding: None,
    }
}

#[test]
fn episodic_decay_after_two_days_matches_spec_example() {
    let engine = DecayEngine::new();
    let record = sample_record("clude-d0000001", MemoryKind::Episodic, 2);
    let ctx = DecayContext::at(Utc::now());

    let new_factor = engine.decay_one(&record, &ctx).expect("should decay");
    assert!((new_factor - 0.93f64.powi(2)).abs() < 1e-6);
}

#[test]
fn decay_is_a_no_op_below_stale_window() {
    let engine = DecayEngine::new();
    let record = sample_record("clude-d0000002", MemoryKind::Episodic, 0);
    let ctx = DecayContext::at(Utc::now());
    assert!(engine.decay_one(&record, &ctx).is_none());
}

#[test]
fn decay_never_drops_below_floor() {
    let engine = DecayEngine::new();
    let mut record = sample_record("clude-d0000003", MemoryKind::Episodic, 365);
    record.decay_factor = 0.06;
    let ctx = DecayContext::at(Utc::now());
    let new_factor = engine.decay_one(&record, &ctx).expect("should decay");
    assert!(new_factor >= ctx.config.floor);
}

#[test]
fn decay_is_a_no_op_once_at_floor() {
    let engine = DecayEngine::new();
    let mut record = sample_record("clude-d0000004", MemoryKind::Episodic, 365);
    record.decay_factor = 0.05;
    let ctx = DecayContext::at(Utc::now());
    assert!(engine.decay_one(&record, &ctx).is_none());
}

#[test]
fn compacted_records_never_decay() {
    let engine = DecayEngine::new();
    let mut record = sample_record("clude-d0000005", MemoryKind::Episodic, 365);
    record.compacted = true;
    let ctx = DecayContext::at(Utc::now());
    assert!(engine.decay_one(&record, &ctx).is_none());
}

#[tokio::test]
async fn run_persists_decayed_factors_through_the_store() {
    let store = SqliteStore::open_in_memory().unwrap();
    let record = sample_record("clude-d0000006", MemoryKind::Episodic, 2);
    let id = store.insert_record(record).await.unwrap();

    let engine = DecayEngine::new();
    let ctx = DecayContext::at(Utc::now());
    let report = engine.run(&store, &ctx).await.unwrap();
    assert_eq!(report.records_decayed, 1);

    let updated = store.get_record(id).await.unwrap().unwrap();
    assert!((updated.decay_factor - 0.93f64.powi(2)).abs() < 1e-6);
}
