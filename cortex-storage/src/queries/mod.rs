//! Query helpers, one module per table family.

pub mod bond_ops;
pub mod dream_log_ops;
pub mod entity_ops;
pub mod memory_crud;
pub mod vector_search;
