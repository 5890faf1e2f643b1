//! # cortex-core
//!
//! Shared types, capability traits, configuration, and the error taxonomy
//! for the Cortex memory engine. Every other `cortex-*` crate depends on
//! this one; it depends on nothing else in the workspace.

pub mod cancel;
pub mod config;
pub mod errors;
pub mod memory;
pub mod traits;

pub use cancel::Cancellation;
pub use config::CortexConfig;
pub use errors::{CortexError, CortexResult};
