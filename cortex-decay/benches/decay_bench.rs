use chrono::{Duration, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::json;

use cortex_core::memory::{MemoryKind, MemoryRecord};
use cortex_decay::{DecayContext, DecayEngine};

fn make_records(count: usize) -> Vec<MemoryRecord> {
    let now = Utc::now();
    (0..count)
        .map(|i| MemoryRecord {
            id: i as i64,
            hash_id: format!("clude-{i:08x}"),
            kind: MemoryKind::Episodic,
            content: "benchmark content".to_string(),
            summary: "benchmark".to_string(),
            tags: vec![],
            concepts: vec![],
            valence: 0.0,
            importance: 0.5,
            access_count: (i * 3) as u64,
            source: "bench".to_string(),
            source_id: None,
            owner_id: None,
            wallet_id: None,
            metadata: json!({}),
            created_at: now - Duration::days((i % 30) as i64),
            last_accessed: now - Duration::days((i % 90) as i64),
            decay_factor: 1.0,
            evidence_ids: vec![],
            external_signature: None,
            compacted: false,
            compacted_into: None,
            embedding: None,
        })
        .collect()
}

fn decay_benchmarks(c: &mut Criterion) {
    let engine = DecayEngine::new();
    let ctx = DecayContext::default();

    let records_1k = make_records(1_000);
    c.bench_function("decay_1k_records", |b| b.iter(|| engine.process_batch(&records_1k, &ctx)));

    let records_10k = make_records(10_000);
    c.bench_function("decay_10k_records", |b| b.iter(|| engine.process_batch(&records_10k, &ctx)));
}

criterion_group!(benches, decay_benchmarks);
criterion_main!(benches);
