use chrono::{Duration, Utc};
use serde_json::json;

use cortex_core::config::ConsolidationConfig;
use cortex_core::errors::CortexResult;
use cortex_core::memory::{Bond, BondKind, MemoryKind, MemoryRecord};
use cortex_core::traits::{KVStore, LanguageModel};
use cortex_consolidation::DreamEngine;
use cortex_storage::SqliteStore;

struct StubLanguageModel;

impl LanguageModel for StubLanguageModel {
    async fn complete(&self, _prompt: &str) -> CortexResult<String> {
        Ok("first self-observation\nsecond self-observation".to_string())
    }
}

fn episodic(concept: &str, age_days: i64, importance: f64, decay_factor: f64) -> MemoryRecord {
    let now = Utc::now() - Duration::days(age_days);
    MemoryRecord {
        id: 0,
        hash_id: format!("clude-{:08x}", rand_suffix()),
        kind: MemoryKind::Episodic,
        content: format!("an episodic memory about {concept}"),
        summary: format!("a memory about {concept}"),
        tags: vec![],
        concepts: vec![concept.to_string()],
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
        decay_factor,
        evidence_ids: vec![],
        external_signature: None,
        compacted: false,
        compacted_into: None,
        embedding: None,
    }
}

// A small non-cryptographic counter is enough to keep hash ids distinct
// within a single test process.
fn rand_suffix() -> u32 {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(1);
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

#[tokio::test]
async fn cycle_without_llm_short_circuits_after_compaction() {
    let store = SqliteStore::open_in_memory().unwrap();
    for _ in 0..3 {
        store.insert_record(episodic("rust", 1, 0.5, 1.0)).await.unwrap();
    }

    let engine = DreamEngine::new(ConsolidationConfig::default());
    let report = engine
        .run_cycle::<SqliteStore, StubLanguageModel>(&store, None, None)
        .await
        .unwrap();

    assert!(report.short_circuited);
    assert_eq!(report.phases.len(), 2);
    assert!(!report.phases[0].new_record_ids.is_empty());
}

#[tokio::test]
async fn cycle_with_llm_runs_all_five_phases() {
    let store = SqliteStore::open_in_memory().unwrap();
    for _ in 0..3 {
        store.insert_record(episodic("finance", 1, 0.5, 1.0)).await.unwrap();
    }
    let a = store.insert_record(episodic("wallets", 10, 0.3, 1.0)).await.unwrap();
    let b = store.insert_record(episodic("wallets", 10, 0.3, 1.0)).await.unwrap();
    store.insert_bond(Bond::new(a, b, BondKind::Contradicts, 0.6)).await.unwrap();

    let llm = StubLanguageModel;
    let engine = DreamEngine::new(ConsolidationConfig::default());
    let report = engine.run_cycle(&store, Some(&llm), None).await.unwrap();

    assert!(!report.short_circuited);
    assert_eq!(report.phases.len(), 5);

    let reflection_phase = &report.phases[2];
    assert_eq!(reflection_phase.new_record_ids.len(), 2);

    let contradiction_phase = &report.phases[3];
    assert_eq!(contradiction_phase.new_record_ids.len(), 1);
}

#[tokio::test]
async fn concurrent_cycle_is_rejected_while_one_is_running() {
    let store = SqliteStore::open_in_memory().unwrap();
    let engine = DreamEngine::new(ConsolidationConfig::default());

    assert!(!engine.is_running());
    let first = engine.run_cycle::<SqliteStore, StubLanguageModel>(&store, None, None);
    let second = engine.run_cycle::<SqliteStore, StubLanguageModel>(&store, None, None);
    let (first, second) = tokio::join!(first, second);

    assert!(first.is_ok());
    assert!(matches!(
        second,
        Err(cortex_core::CortexError::ConsolidationError(cortex_core::errors::ConsolidationError::AlreadyRunning))
    ));
    assert!(!engine.is_running());
}

#[tokio::test]
async fn emergence_callback_receives_the_synthesis_text() {
    let store = SqliteStore::open_in_memory().unwrap();
    for _ in 0..3 {
        store.insert_record(episodic("launch", 1, 0.5, 1.0)).await.unwrap();
    }

    let llm = StubLanguageModel;
    let received = std::sync::Mutex::new(None);
    let callback = |text: &str| -> CortexResult<()> {
        *received.lock().unwrap() = Some(text.to_string());
        Ok(())
    };

    let engine = DreamEngine::new(ConsolidationConfig::default());
    engine.run_cycle(&store, Some(&llm), Some(&callback)).await.unwrap();

    assert!(received.lock().unwrap().is_some());
}
