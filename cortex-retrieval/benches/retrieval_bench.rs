use chrono::{Duration, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::json;

use cortex_core::config::RetrievalConfig;
use cortex_core::memory::{MemoryKind, MemoryRecord};
use cortex_retrieval::scoring;

fn make_records(count: usize) -> Vec<MemoryRecord> {
    let now = Utc::now();
    (0..count)
        .map(|i| MemoryRecord {
            id: i as i64,
            hash_id: format!("clude-{i:08x}"),
            kind: MemoryKind::Semantic,
            content: format!("benchmark memory number {i} about retrieval scoring"),
            summary: format!("benchmark memory {i}"),
            tags: vec!["bench".to_string()],
            concepts: vec![],
            valence: 0.0,
            importance: 0.5,
            access_count: (i % 20) as u64,
            source: "bench".to_string(),
            source_id: None,
            owner_id: None,
            wallet_id: None,
            metadata: json!({}),
            created_at: now - Duration::hours((i % 720) as i64),
            last_accessed: now - Duration::hours((i % 240) as i64),
            decay_factor: 1.0,
            evidence_ids: vec![],
            external_signature: None,
            compacted: false,
            compacted_into: None,
            embedding: None,
        })
        .collect()
}

fn score_all(records: &[MemoryRecord], config: &RetrievalConfig, query_words: &[String], now: chrono::DateTime<Utc>) {
    for record in records {
        let recency = scoring::recency(scoring::age_hours(record.created_at, now), config.legacy_recency);
        let relevance = scoring::relevance(query_words, &record.summary);
        let tag_score = scoring::tag_score(&[], &record.tags);
        scoring::composite_score(config, recency, relevance, record.importance, 0.0, 0.0, record.decay_factor, tag_score);
    }
}

fn bench_scoring(c: &mut Criterion) {
    let config = RetrievalConfig::default();
    let query_words = scoring::query_words(Some("retrieval scoring"));
    let now = Utc::now();

    let records_100 = make_records(100);
    c.bench_function("score_100_records", |b| b.iter(|| score_all(&records_100, &config, &query_words, now)));

    let records_10k = make_records(10_000);
    c.bench_function("score_10k_records", |b| b.iter(|| score_all(&records_10k, &config, &query_words, now)));
}

criterion_group!(benches, bench_scoring);
criterion_main!(benches);
