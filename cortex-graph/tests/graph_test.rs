use chrono::Utc;
use serde_json::json;

use cortex_core::memory::{BondDirection, BondKind, MemoryKind, MemoryRecord};
use cortex_core::traits::KVStore;
use cortex_graph::{AssociationLinker, EntityExtractor};
use cortex_storage::SqliteStore;

fn sample_record(hash_id: &str, content: &str) -> MemoryRecord {
    let now = Utc::now();
    MemoryRecord {
        id: 0,
        hash_id: hash_id.to_string(),
        kind: MemoryKind::Episodic,
        content: content.to_string(),
        summary: content.chars().take(40).collect(),
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
async fn extractor_finds_handle_wallet_and_token_mentions() {
    let store = SqliteStore::open_in_memory().unwrap();
    let content = "Talked to @alice about $SOL and wallet 4Nd1mBQtrMJVYVfKf4fCDr5vKWnJY2eVGWxMvWoVRmxH";
    let mut record = sample_record("clude-f0000001", content);
    record.id = store.insert_record(record.clone()).await.unwrap();

    let extractor = EntityExtractor::default();
    let entity_ids = extractor.process(&store, &record).await.unwrap();
    assert_eq!(entity_ids.len(), 3);

    let mentions = store.mentions_for_record(record.id).await.unwrap();
    assert_eq!(mentions.len(), 3);
}

#[tokio::test]
async fn extractor_records_pairwise_cooccurrence() {
    let store = SqliteStore::open_in_memory().unwrap();
    let content = "@alice and @bob are collaborating";
    let mut record = sample_record("clude-f0000002", content);
    record.id = store.insert_record(record.clone()).await.unwrap();

    let extractor = EntityExtractor::default();
    let entity_ids = extractor.process(&store, &record).await.unwrap();
    assert_eq!(entity_ids.len(), 2);
    assert_eq!(
        store.cooccurrence_count(entity_ids[0], entity_ids[1]).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn linker_creates_supports_bond_from_evidence_hash() {
    let store = SqliteStore::open_in_memory().unwrap();

    let mut cited = sample_record("clude-f0000003", "original claim");
    cited.id = store.insert_record(cited.clone()).await.unwrap();

    let mut citing = sample_record("clude-f0000004", "a follow-up claim");
    citing.evidence_ids = vec!["clude-f0000003".to_string()];
    citing.id = store.insert_record(citing.clone()).await.unwrap();

    let linker = AssociationLinker::default();
    let bonds = linker.link(&store, &citing).await.unwrap();
    assert_eq!(bonds.len(), 1);
    assert_eq!(bonds[0].kind, BondKind::Supports);
    assert_eq!(bonds[0].target_id, cited.id);

    let stored = store.list_bonds(citing.id, BondDirection::Outgoing).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn linker_creates_contradicts_bond_from_rule_pattern() {
    let store = SqliteStore::open_in_memory().unwrap();

    let mut target = sample_record("clude-f0000005", "the deploy window is Tuesday");
    target.id = store.insert_record(target.clone()).await.unwrap();

    let mut citing = sample_record(
        "clude-f0000006",
        &format!("this contradicts record #{}", target.id),
    );
    citing.id = store.insert_record(citing.clone()).await.unwrap();

    let linker = AssociationLinker::default();
    let bonds = linker.link(&store, &citing).await.unwrap();
    assert_eq!(bonds.len(), 1);
    assert_eq!(bonds[0].kind, BondKind::Contradicts);
    assert_eq!(bonds[0].target_id, target.id);
}
