//! # cortex-decay
//!
//! Periodic recency decay of memory records (spec.md §4.7): each
//! non-compacted record whose `lastAccessed` is older than the configured
//! staleness window has its `decayFactor` multiplied by a per-kind daily
//! rate, floored at the configured minimum.

mod context;
mod engine;

pub use context::DecayContext;
pub use engine::{days_between, DecayEngine, DecayReport};
