//! In-memory bond graph cache used by the recall pipeline's bond-traversal
//! phase (spec.md §4.5 phase 6). Mirrors the store's `bonds` table but keeps
//! it in a `petgraph::stable_graph` for cheap neighbor walks instead of a
//! query per hop.
//!
//! Unlike a causal graph, bonds are explicitly allowed to cycle (spec.md §9:
//! "Bonds can form cycles... traversal algorithms MUST maintain a visited
//! set keyed by record id and terminate at the stated depth"), so writes
//! here never reject an edge for closing a cycle.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use cortex_core::errors::{CortexError, CortexResult};
use cortex_core::memory::{Bond, BondKind};

type EdgeWeight = (BondKind, f64);

struct Inner {
    graph: StableDiGraph<i64, EdgeWeight>,
    index: HashMap<i64, NodeIndex>,
}

impl Inner {
    fn new() -> Self {
        Self { graph: StableDiGraph::new(), index: HashMap::new() }
    }

    fn ensure_node(&mut self, record_id: i64) -> NodeIndex {
        if let Some(ix) = self.index.get(&record_id) {
            return *ix;
        }
        let ix = self.graph.add_node(record_id);
        self.index.insert(record_id, ix);
        ix
    }
}

/// A hop discovered during bounded traversal: the record reached, the depth
/// at which it was reached, and the `graphBoost` earned via the edge that
/// reached it (spec.md §4.5: `strength * 0.8^depth`).
#[derive(Debug, Clone, PartialEq)]
pub struct TraversalHit {
    pub record_id: i64,
    pub depth: u32,
    pub graph_boost: f64,
    pub via: BondKind,
}

/// Cheaply cloneable handle onto a shared bond graph.
pub struct BondGraph {
    inner: Arc<RwLock<Inner>>,
}

impl Clone for BondGraph {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl Default for BondGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl BondGraph {
    pub fn new() -> Self {
        Self { inner: Arc::new(RwLock::new(Inner::new())) }
    }

    fn read(&self) -> CortexResult<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|e| CortexError::ConcurrencyError(format!("bond graph read lock poisoned: {e}")))
    }

    fn write(&self) -> CortexResult<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|e| CortexError::ConcurrencyError(format!("bond graph write lock poisoned: {e}")))
    }

    /// Insert or overwrite the cached edge for `bond`. At most one cached
    /// edge exists per `(source, target, kind)`, matching the store's
    /// uniqueness constraint.
    pub fn upsert_bond(&self, bond: &Bond) -> CortexResult<()> {
        let mut inner = self.write()?;
        let src = inner.ensure_node(bond.source_id);
        let dst = inner.ensure_node(bond.target_id);

        // Distinct kinds between the same ordered pair are distinct edges;
        // petgraph's StableDiGraph allows parallel edges so only an edge of
        // the same kind gets overwritten in place.
        let existing_same_kind = inner
            .graph
            .edges_connecting(src, dst)
            .find(|e| e.weight().0 == bond.kind)
            .map(|e| e.id());
        if let Some(edge_id) = existing_same_kind {
            if let Some(w) = inner.graph.edge_weight_mut(edge_id) {
                w.1 = bond.strength;
            }
        } else {
            inner.graph.add_edge(src, dst, (bond.kind, bond.strength));
        }
        Ok(())
    }

    pub fn remove_bond(&self, source_id: i64, target_id: i64, kind: BondKind) -> CortexResult<()> {
        let mut inner = self.write()?;
        let (Some(&src), Some(&dst)) = (inner.index.get(&source_id), inner.index.get(&target_id)) else {
            return Ok(());
        };
        if let Some(edge_id) = inner
            .graph
            .edges_connecting(src, dst)
            .find(|e| e.weight().0 == kind)
            .map(|e| e.id())
        {
            inner.graph.remove_edge(edge_id);
        }
        Ok(())
    }

    pub fn node_count(&self) -> CortexResult<usize> {
        Ok(self.read()?.graph.node_count())
    }

    pub fn edge_count(&self) -> CortexResult<usize> {
        Ok(self.read()?.graph.edge_count())
    }

    /// Outgoing bonds from `record_id` ordered by traversal priority
    /// (spec.md §4.5: `causes > supports > resolves > elaborates >
    /// contradicts > relates > follows`).
    pub fn outgoing(&self, record_id: i64) -> CortexResult<Vec<(i64, BondKind, f64)>> {
        let inner = self.read()?;
        let Some(&ix) = inner.index.get(&record_id) else {
            return Ok(Vec::new());
        };
        let mut out: Vec<(i64, BondKind, f64)> = inner
            .graph
            .edges_directed(ix, Direction::Outgoing)
            .map(|e| (inner.graph[e.target()], e.weight().0, e.weight().1))
            .collect();
        out.sort_by_key(|(_, kind, _)| kind.traversal_priority());
        Ok(out)
    }

    /// Depth-bounded traversal from a seed set of top candidates, per
    /// spec.md §4.5 phase 6: walk outgoing bonds in traversal-priority
    /// order, depth <= `max_depth`, visited-set gated so cycles terminate,
    /// awarding `graphBoost = strength * 0.8^depth` at each hop.
    pub fn traverse(&self, seeds: &[i64], max_depth: u32) -> CortexResult<Vec<TraversalHit>> {
        let inner = self.read()?;
        let mut visited: HashSet<i64> = seeds.iter().copied().collect();
        let mut hits = Vec::new();
        let mut frontier: Vec<i64> = seeds.to_vec();

        for depth in 1..=max_depth {
            let mut next_frontier = Vec::new();
            for &record_id in &frontier {
                let Some(&ix) = inner.index.get(&record_id) else { continue };
                let mut edges: Vec<_> = inner.graph.edges_directed(ix, Direction::Outgoing).collect();
                edges.sort_by_key(|e| e.weight().0.traversal_priority());
                for edge in edges {
                    let target_id = inner.graph[edge.target()];
                    if visited.contains(&target_id) {
                        continue;
                    }
                    visited.insert(target_id);
                    let (kind, strength) = *edge.weight();
                    hits.push(TraversalHit {
                        record_id: target_id,
                        depth,
                        graph_boost: strength * 0.8f64.powi(depth as i32),
                        via: kind,
                    });
                    next_frontier.push(target_id);
                }
            }
            if next_frontier.is_empty() {
                break;
            }
            frontier = next_frontier;
        }

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_respects_depth_and_visited_set() {
        let graph = BondGraph::new();
        graph.upsert_bond(&Bond::new(1, 2, BondKind::Causes, 1.0)).unwrap();
        graph.upsert_bond(&Bond::new(2, 3, BondKind::Supports, 0.9)).unwrap();
        graph.upsert_bond(&Bond::new(3, 1, BondKind::Relates, 0.5)).unwrap();

        let hits = graph.traverse(&[1], 2).unwrap();
        let ids: Vec<i64> = hits.iter().map(|h| h.record_id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert!(hits[0].graph_boost > hits[1].graph_boost * 1.0 || hits[1].depth > hits[0].depth);
    }

    #[test]
    fn upsert_overwrites_same_kind_edge() {
        let graph = BondGraph::new();
        graph.upsert_bond(&Bond::new(1, 2, BondKind::Relates, 0.3)).unwrap();
        graph.upsert_bond(&Bond::new(1, 2, BondKind::Relates, 0.9)).unwrap();
        let out = graph.outgoing(1).unwrap();
        assert_eq!(out.len(), 1);
        assert!((out[0].2 - 0.9).abs() < 1e-9);
    }

    #[test]
    fn distinct_kinds_between_same_pair_both_survive() {
        let graph = BondGraph::new();
        graph.upsert_bond(&Bond::new(1, 2, BondKind::Relates, 0.3)).unwrap();
        graph.upsert_bond(&Bond::new(1, 2, BondKind::Supports, 0.8)).unwrap();
        let out = graph.outgoing(1).unwrap();
        assert_eq!(out.len(), 2);
    }
}
