use chrono::Utc;
use serde_json::json;

use cortex_core::errors::{CortexError, StorageError};
use cortex_core::memory::{
    Bond, BondDirection, BondKind, CandidateQuery, EntityKind, MemoryKind, MemoryRecord,
};
use cortex_core::traits::KVStore;
use cortex_storage::SqliteStore;

fn sample_record(hash_id: &str, importance: f64) -> MemoryRecord {
    let now = Utc::now();
    MemoryRecord {
        id: 0,
        hash_id: hash_id.to_string(),
        kind: MemoryKind::Episodic,
        content: "user likes rust".to_string(),
        summary: "user likes rust".to_string(),
        tags: vec!["preference".to_string()],
        concepts: vec![],
        valence: 0.5,
        importance,
        access_count: 0,
        source: "test".to_string(),
        source_id: None,
        owner_id: Some("owner-1".to_string()),
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
async fn insert_and_get_round_trips() {
    let store = SqliteStore::open_in_memory().unwrap();
    let record = sample_record("clude-aaaaaaaa", 0.5);
    let id = store.insert_record(record.clone()).await.unwrap();
    let fetched = store.get_record(id).await.unwrap().unwrap();
    assert_eq!(fetched.hash_id, "clude-aaaaaaaa");
    assert_eq!(fetched.content, record.content);
}

#[tokio::test]
async fn duplicate_hash_id_is_conflict() {
    let store = SqliteStore::open_in_memory().unwrap();
    let record = sample_record("clude-bbbbbbbb", 0.5);
    store.insert_record(record.clone()).await.unwrap();
    let err = store.insert_record(record).await.unwrap_err();
    assert!(matches!(
        err,
        CortexError::StorageError(StorageError::Conflict { .. })
    ));
}

#[tokio::test]
async fn query_candidates_orders_by_importance_then_recency() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.insert_record(sample_record("clude-c0000001", 0.4)).await.unwrap();
    store.insert_record(sample_record("clude-c0000002", 0.9)).await.unwrap();
    store.insert_record(sample_record("clude-c0000003", 0.3)).await.unwrap();

    let spec = CandidateQuery {
        limit: Some(10),
        ..Default::default()
    };
    let results = store.query_candidates(&spec).await.unwrap();
    assert_eq!(results[0].hash_id, "clude-c0000002");
}

#[tokio::test]
async fn update_record_patches_only_allowed_fields() {
    let store = SqliteStore::open_in_memory().unwrap();
    let record = sample_record("clude-dddddddd", 0.5);
    let id = store.insert_record(record).await.unwrap();

    let patch = cortex_core::memory::RecordPatch {
        access_count: Some(5),
        decay_factor: Some(0.7),
        ..Default::default()
    };
    store.update_record(id, patch).await.unwrap();

    let updated = store.get_record(id).await.unwrap().unwrap();
    assert_eq!(updated.access_count, 5);
    assert!((updated.decay_factor - 0.7).abs() < 1e-9);
}

#[tokio::test]
async fn bonds_upsert_on_same_ordered_pair_and_kind() {
    let store = SqliteStore::open_in_memory().unwrap();
    let a = store.insert_record(sample_record("clude-e0000001", 0.5)).await.unwrap();
    let b = store.insert_record(sample_record("clude-e0000002", 0.5)).await.unwrap();

    store.insert_bond(Bond::new(a, b, BondKind::Relates, 0.3)).await.unwrap();
    store.insert_bond(Bond::new(a, b, BondKind::Relates, 0.8)).await.unwrap();

    let bonds = store.list_bonds(a, BondDirection::Outgoing).await.unwrap();
    assert_eq!(bonds.len(), 1);
    assert!((bonds[0].strength - 0.8).abs() < 1e-9);
}

#[tokio::test]
async fn entity_upsert_is_idempotent_by_kind_and_normalized_name() {
    let store = SqliteStore::open_in_memory().unwrap();
    let (id1, created1) = store.upsert_entity(EntityKind::Person, "Alice", "alice").await.unwrap();
    let (id2, created2) = store.upsert_entity(EntityKind::Person, "Alice", "alice").await.unwrap();
    assert_eq!(id1, id2);
    assert!(created1);
    assert!(!created2);
}

#[tokio::test]
async fn cooccurrence_counter_is_symmetric() {
    let store = SqliteStore::open_in_memory().unwrap();
    let (a, _) = store.upsert_entity(EntityKind::Person, "Alice", "alice").await.unwrap();
    let (b, _) = store.upsert_entity(EntityKind::Person, "Bob", "bob").await.unwrap();

    store.record_cooccurrence(a, b).await.unwrap();
    store.record_cooccurrence(b, a).await.unwrap();

    assert_eq!(store.cooccurrence_count(a, b).await.unwrap(), 2);
    assert_eq!(store.cooccurrence_count(b, a).await.unwrap(), 2);
}
