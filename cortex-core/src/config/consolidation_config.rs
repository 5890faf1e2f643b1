use serde::{Deserialize, Serialize};

/// Dream cycle tunables (spec.md §4.8).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    /// Wall-clock period between scheduled dream cycles.
    pub cycle_interval_hours: i64,
    /// Cumulative importance threshold that triggers an event-driven cycle.
    pub importance_trigger_threshold: f64,
    /// Consolidation phase: lookback window for episodic clustering.
    pub consolidation_window_hours: i64,
    /// Consolidation phase: minimum cluster size to synthesize a summary.
    pub consolidation_min_cluster_size: usize,
    /// Compaction phase: minimum age of an episodic record to be eligible.
    pub compaction_min_age_days: i64,
    pub compaction_max_decay: f64,
    pub compaction_max_importance: f64,
    /// Reflection phase: lookback window for recent semantic memories.
    pub reflection_window_hours: i64,
    pub reflection_min_observations: usize,
    pub reflection_max_observations: usize,
    /// Contradiction resolution: decay multiplier applied to the weaker memory.
    pub contradiction_decay_multiplier: f64,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            cycle_interval_hours: 6,
            importance_trigger_threshold: 5.0,
            consolidation_window_hours: 72,
            consolidation_min_cluster_size: 3,
            compaction_min_age_days: 7,
            compaction_max_decay: 0.3,
            compaction_max_importance: 0.5,
            reflection_window_hours: 72,
            reflection_min_observations: 1,
            reflection_max_observations: 3,
            contradiction_decay_multiplier: 0.5,
        }
    }
}
