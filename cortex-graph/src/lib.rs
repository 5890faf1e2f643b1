//! # cortex-graph
//!
//! Entity extraction (spec.md §4.3), association linking (spec.md §4.4),
//! and an in-memory bond graph cache used by the recall pipeline's
//! bond-traversal phase.

pub mod bond_graph;
pub mod extractor;
pub mod linker;

pub use bond_graph::BondGraph;
pub use extractor::EntityExtractor;
pub use linker::AssociationLinker;
