use chrono::{DateTime, Utc};

use cortex_core::config::DecayConfig;

/// The fixed point in time a decay pass runs against, paired with the
/// tunables it uses. Pinning `now` lets a batch of records decay against a
/// single instant instead of drifting mid-pass.
#[derive(Debug, Clone)]
pub struct DecayContext {
    pub now: DateTime<Utc>,
    pub config: DecayConfig,
}

impl DecayContext {
    pub fn new(now: DateTime<Utc>, config: DecayConfig) -> Self {
        Self { now, config }
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        Self::new(now, DecayConfig::default())
    }
}

impl Default for DecayContext {
    fn default() -> Self {
        Self::new(Utc::now(), DecayConfig::default())
    }
}
