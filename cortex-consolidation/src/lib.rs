//! # cortex-consolidation
//!
//! The dream cycle (spec.md §4.8): a cooperative background routine that
//! runs five ordered phases over stored memories — consolidation,
//! compaction, reflection, contradiction resolution, emergence — each
//! producing a [`cortex_core::memory::DreamLog`] and, where warranted, new
//! derived records and bonds.

pub mod clustering;
mod engine;
mod pipeline;

pub use engine::{DreamCycleReport, DreamEngine, PhaseReport};
