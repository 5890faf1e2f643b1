use chrono::Utc;

use cortex_core::errors::CortexResult;
use cortex_core::memory::{Bond, BondDirection, BondKind, RecordPatch};
use cortex_core::traits::KVStore;

/// Hebbian co-retrieval update applied after a recall (spec.md §4.6).
/// Eventually consistent: callers invoke `reinforce` without awaiting it on
/// the caller's hot path, typically from a detached task.
#[derive(Debug, Clone, Default)]
pub struct Reinforcer;

impl Reinforcer {
    pub fn new() -> Self {
        Self
    }

    /// Bumps access bookkeeping for every id in `ids`, then strengthens (or
    /// creates) a `relates` bond for every ordered pair of distinct ids.
    pub async fn reinforce(&self, store: &impl KVStore, ids: &[i64]) -> CortexResult<()> {
        let now = Utc::now();

        for &id in ids {
            let Some(record) = store.get_record(id).await? else {
                continue;
            };
            store
                .update_record(
                    id,
                    RecordPatch {
                        access_count: Some(record.access_count + 1),
                        last_accessed: Some(now),
                        decay_factor: Some(1.0),
                        ..Default::default()
                    },
                )
                .await?;
        }

        for i in 0..ids.len() {
            for j in 0..ids.len() {
                if i == j {
                    continue;
                }
                self.strengthen_relates(store, ids[i], ids[j]).await?;
            }
        }

        Ok(())
    }

    async fn strengthen_relates(&self, store: &impl KVStore, a: i64, b: i64) -> CortexResult<()> {
        let existing = store
            .list_bonds(a, BondDirection::Outgoing)
            .await?
            .into_iter()
            .find(|bond| bond.target_id == b && bond.kind == BondKind::Relates);

        let bond = match existing {
            Some(mut bond) => {
                bond.strength = (bond.strength + 0.05).min(1.0);
                bond
            }
            None => Bond::new(a, b, BondKind::Relates, 0.3),
        };
        store.update_bond(bond).await
    }
}
