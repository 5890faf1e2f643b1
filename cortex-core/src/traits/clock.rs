use chrono::{DateTime, Utc};

/// Injectable wall-clock source so decay and scheduling logic can be
/// driven deterministically in tests (spec.md §6 edge cases around decay
/// staleness), mirroring the teacher's treatment of time as a capability
/// rather than a direct `Utc::now()` call scattered through the engine.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The default `Clock`, backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
