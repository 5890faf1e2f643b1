use chrono::Utc;
use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::json;

use cortex_core::memory::{MemoryKind, MemoryRecord};
use cortex_core::traits::KVStore;
use cortex_storage::SqliteStore;

fn make_record(i: u64) -> MemoryRecord {
    let now = Utc::now();
    MemoryRecord {
        id: 0,
        hash_id: format!("clude-{i:08x}"),
        kind: MemoryKind::Episodic,
        content: format!("benchmark content number {i}"),
        summary: "benchmark memory".to_string(),
        tags: vec!["bench".to_string()],
        concepts: vec![],
        valence: 0.0,
        importance: 0.5,
        access_count: 0,
        source: "bench".to_string(),
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

fn bench_insert(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = SqliteStore::open_in_memory().unwrap();
    let mut counter = 0u64;

    c.bench_function("insert_record", |b| {
        b.iter(|| {
            counter += 1;
            rt.block_on(store.insert_record(make_record(counter))).unwrap();
        });
    });
}

fn bench_get(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = SqliteStore::open_in_memory().unwrap();
    let ids: Vec<i64> = (0..100)
        .map(|i| rt.block_on(store.insert_record(make_record(i))).unwrap())
        .collect();

    c.bench_function("get_record", |b| {
        let mut idx = 0;
        b.iter(|| {
            let id = ids[idx % ids.len()];
            rt.block_on(store.get_record(id)).unwrap();
            idx += 1;
        });
    });
}

criterion_group!(benches, bench_insert, bench_get);
criterion_main!(benches);
