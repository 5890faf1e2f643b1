pub mod capability_config;
pub mod consolidation_config;
pub mod decay_config;
pub mod graph_config;
pub mod retrieval_config;
pub mod storage_config;

use serde::{Deserialize, Serialize};

pub use capability_config::CapabilityConfig;
pub use consolidation_config::ConsolidationConfig;
pub use decay_config::DecayConfig;
pub use graph_config::GraphConfig;
pub use retrieval_config::RetrievalConfig;
pub use storage_config::StorageConfig;

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CortexConfig {
    pub storage: StorageConfig,
    pub retrieval: RetrievalConfig,
    pub consolidation: ConsolidationConfig,
    pub decay: DecayConfig,
    pub graph: GraphConfig,
    pub capability: CapabilityConfig,
}

impl CortexConfig {
    /// Load config from a TOML string, falling back to defaults for missing fields.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}
