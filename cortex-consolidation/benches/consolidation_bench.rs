use chrono::Utc;
use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::json;

use cortex_consolidation::clustering::group_by_dominant_concept;
use cortex_core::memory::{MemoryKind, MemoryRecord};

fn make_records(count: usize) -> Vec<MemoryRecord> {
    let now = Utc::now();
    (0..count)
        .map(|i| MemoryRecord {
            id: i as i64,
            hash_id: format!("clude-{i:08x}"),
            kind: MemoryKind::Semantic,
            content: format!("consolidation benchmark content {i}"),
            summary: format!("consolidation benchmark {i}"),
            tags: vec![],
            concepts: vec![format!("concept-{}", i % 5)],
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
        })
        .collect()
}

fn bench_cluster_by_concept(c: &mut Criterion) {
    c.bench_function("cluster_5_records", |b| {
        b.iter_batched(|| make_records(5), group_by_dominant_concept, criterion::BatchSize::SmallInput)
    });

    c.bench_function("cluster_1k_records", |b| {
        b.iter_batched(|| make_records(1_000), group_by_dominant_concept, criterion::BatchSize::SmallInput)
    });
}

criterion_group!(benches, bench_cluster_by_concept);
criterion_main!(benches);
