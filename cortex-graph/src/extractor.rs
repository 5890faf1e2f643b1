//! Deterministic entity extraction (spec.md §4.3): a fixed pattern order,
//! each with its own salience contribution, followed by co-occurrence
//! counting across the entities mentioned in one record.

use std::sync::OnceLock;

use regex::Regex;

use cortex_core::config::GraphConfig;
use cortex_core::errors::CortexResult;
use cortex_core::memory::{concept_lexicon, EntityKind, MemoryRecord, Mention};
use cortex_core::traits::KVStore;

fn handle_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@([A-Za-z0-9_]{2,32})").unwrap())
}

fn wallet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Base58 alphabet, length 32-44 (spec.md §4.3).
    RE.get_or_init(|| Regex::new(r"\b[1-9A-HJ-NP-Za-km-z]{32,44}\b").unwrap())
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$([A-Z]{2,6})\b").unwrap())
}

fn proper_noun_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([A-Z][a-zA-Z]+ [A-Z][a-zA-Z]+)\b").unwrap())
}

/// Extracts entities from record content in the pattern order spec.md
/// §4.3 fixes, persisting mentions and updating co-occurrence counts
/// through the injected [`KVStore`].
pub struct EntityExtractor {
    config: GraphConfig,
}

impl EntityExtractor {
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }

    /// Run extraction against `record`'s content, writing entities and
    /// mentions through `store`, then increment pairwise co-occurrence
    /// for every pair of distinct entities found.
    pub async fn process(&self, store: &impl KVStore, record: &MemoryRecord) -> CortexResult<Vec<i64>> {
        let content = &record.content;
        let mut found: Vec<(i64, usize, usize)> = Vec::new();

        for (mat, kind, salience) in scan_handles(content, self.config.handle_salience)
            .into_iter()
            .chain(scan_wallets(content, self.config.wallet_salience))
            .chain(scan_tokens(content, self.config.token_salience))
            .chain(scan_proper_nouns(content, self.config.proper_noun_salience))
            .chain(scan_concepts(content, self.config.concept_salience))
        {
            let normalized = normalize(&mat.as_str_owned());
            let (entity_id, _created) = store
                .upsert_entity(kind, &mat.canonical, &normalized)
                .await?;
            store
                .insert_mention(Mention {
                    record_id: record.id,
                    entity_id,
                    salience,
                    offset_start: mat.start,
                    offset_end: mat.end,
                })
                .await?;
            store.increment_entity_mention(entity_id, record.last_accessed).await?;
            found.push((entity_id, mat.start, mat.end));
        }

        for i in 0..found.len() {
            for j in (i + 1)..found.len() {
                if found[i].0 != found[j].0 {
                    store.record_cooccurrence(found[i].0, found[j].0).await?;
                }
            }
        }

        tracing::debug!(record_id = record.id, entities = found.len(), "entity extraction complete");
        Ok(found.into_iter().map(|(id, _, _)| id).collect())
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

struct Extracted {
    canonical: String,
    start: usize,
    end: usize,
}

impl Extracted {
    fn as_str_owned(&self) -> String {
        self.canonical.clone()
    }
}

fn scan_handles(content: &str, salience: f64) -> Vec<(Extracted, EntityKind, f64)> {
    handle_re()
        .captures_iter(content)
        .map(|c| {
            let m = c.get(0).unwrap();
            let handle = c.get(1).unwrap().as_str().to_string();
            (
                Extracted { canonical: handle, start: m.start(), end: m.end() },
                EntityKind::Person,
                salience,
            )
        })
        .collect()
}

fn scan_wallets(content: &str, salience: f64) -> Vec<(Extracted, EntityKind, f64)> {
    wallet_re()
        .find_iter(content)
        .map(|m| {
            (
                Extracted { canonical: m.as_str().to_string(), start: m.start(), end: m.end() },
                EntityKind::Wallet,
                salience,
            )
        })
        .collect()
}

fn scan_tokens(content: &str, salience: f64) -> Vec<(Extracted, EntityKind, f64)> {
    token_re()
        .captures_iter(content)
        .map(|c| {
            let m = c.get(0).unwrap();
            let ticker = c.get(1).unwrap().as_str().to_string();
            (
                Extracted { canonical: ticker, start: m.start(), end: m.end() },
                EntityKind::Token,
                salience,
            )
        })
        .collect()
}

fn scan_proper_nouns(content: &str, salience: f64) -> Vec<(Extracted, EntityKind, f64)> {
    proper_noun_re()
        .captures_iter(content)
        .map(|c| {
            let m = c.get(0).unwrap();
            (
                Extracted { canonical: m.as_str().to_string(), start: m.start(), end: m.end() },
                EntityKind::Project,
                salience,
            )
        })
        .collect()
}

fn scan_concepts(content: &str, salience: f64) -> Vec<(Extracted, EntityKind, f64)> {
    let lower = content.to_lowercase();
    let mut out = Vec::new();
    for (concept, keywords) in concept_lexicon() {
        for kw in *keywords {
            if let Some(pos) = lower.find(kw) {
                out.push((
                    Extracted {
                        canonical: concept.to_string(),
                        start: pos,
                        end: pos + kw.len(),
                    },
                    EntityKind::Concept,
                    salience,
                ));
                break;
            }
        }
    }
    out
}
