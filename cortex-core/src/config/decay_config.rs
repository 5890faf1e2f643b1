use serde::{Deserialize, Serialize};

/// Per-kind daily decay rates and thresholds (spec.md §4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    pub episodic_daily_rate: f64,
    pub semantic_daily_rate: f64,
    pub procedural_daily_rate: f64,
    pub self_model_daily_rate: f64,
    pub floor: f64,
    pub stale_after_hours: i64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            episodic_daily_rate: 0.93,
            semantic_daily_rate: 0.98,
            procedural_daily_rate: 0.97,
            self_model_daily_rate: 0.99,
            floor: 0.05,
            stale_after_hours: 24,
        }
    }
}
