//! Association linking (spec.md §4.4): embedding-similarity `relates`
//! bonds plus rule-based `contradicts`/`supports` bonds, both idempotent
//! per ordered pair + kind (the store enforces this on conflict).

use std::sync::OnceLock;

use regex::Regex;

use cortex_core::config::GraphConfig;
use cortex_core::errors::CortexResult;
use cortex_core::memory::{Bond, BondKind, MemoryRecord};
use cortex_core::traits::KVStore;

fn contradiction_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(contradicts|but)\b.*?#(\d+)").unwrap())
}

/// Produces bonds between a freshly stored record and existing records.
pub struct AssociationLinker {
    config: GraphConfig,
}

impl AssociationLinker {
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }

    /// Run both linking signals for `record`, which must already be
    /// persisted (its `id` is used as the bond endpoint).
    pub async fn link(&self, store: &impl KVStore, record: &MemoryRecord) -> CortexResult<Vec<Bond>> {
        let mut created = Vec::new();
        created.extend(self.link_by_embedding(store, record).await?);
        created.extend(self.link_by_rule(store, record).await?);
        tracing::debug!(record_id = record.id, bonds = created.len(), "association linking complete");
        Ok(created)
    }

    async fn link_by_embedding(
        &self,
        store: &impl KVStore,
        record: &MemoryRecord,
    ) -> CortexResult<Vec<Bond>> {
        let Some(embedding) = &record.embedding else {
            return Ok(Vec::new());
        };
        let neighbors = store
            .vector_search(embedding, self.config.similarity_top_k, 0.0)
            .await?;
        let mut bonds = Vec::new();
        for (neighbor_id, similarity) in neighbors {
            if neighbor_id == record.id || similarity < self.config.similarity_threshold {
                continue;
            }
            let bond = Bond::new(record.id, neighbor_id, BondKind::Relates, similarity.min(1.0));
            store.insert_bond(bond.clone()).await?;
            bonds.push(bond);
        }
        Ok(bonds)
    }

    async fn link_by_rule(&self, store: &impl KVStore, record: &MemoryRecord) -> CortexResult<Vec<Bond>> {
        let mut bonds = Vec::new();

        if let Some(caps) = contradiction_re().captures(&record.content) {
            if let Ok(target_id) = caps[2].parse::<i64>() {
                if store.get_record(target_id).await?.is_some() {
                    let bond = Bond::new(record.id, target_id, BondKind::Contradicts, 0.6);
                    store.insert_bond(bond.clone()).await?;
                    bonds.push(bond);
                }
            }
        }

        for evidence_hash in &record.evidence_ids {
            if let Some(cited) = store.get_record_by_hash(evidence_hash).await? {
                let bond = Bond::new(record.id, cited.id, BondKind::Supports, 0.9);
                store.insert_bond(bond.clone()).await?;
                bonds.push(bond);
            }
        }

        Ok(bonds)
    }
}

impl Default for AssociationLinker {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}
