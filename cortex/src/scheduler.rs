//! Periodic dream/decay scheduling (spec.md §6 `startDreamSchedule` /
//! `stopDreamSchedule`): one background task per timer, stopped by
//! aborting its `JoinHandle` (spec.md §4.8: a 6-hour dream cycle, plus a
//! daily decay sweep at 03:00 UTC).

use std::future::Future;
use std::pin::Pin;
use std::time::Duration as StdDuration;

use chrono::Utc;
use tokio::task::JoinHandle;

/// A periodic action, boxed so the scheduler doesn't need to be generic
/// over the capability types the closure captures.
pub type BoxedTick = Box<dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Owns the background tasks behind the two scheduled operations. Dropping
/// it (or calling `stop_all`) aborts whichever tasks are running; they do
/// not outlive the `Cortex` that started them.
#[derive(Default)]
pub struct DreamScheduler {
    dream_task: Option<JoinHandle<()>>,
    decay_task: Option<JoinHandle<()>>,
}

impl DreamScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a task that fires `on_tick` every `cycle_interval_hours`,
    /// skipping the immediate first tick `tokio::time::interval` fires.
    pub fn start_dream_schedule(&mut self, cycle_interval_hours: i64, on_tick: BoxedTick) {
        self.stop_dream_schedule();
        let period = StdDuration::from_secs((cycle_interval_hours.max(1) as u64) * 3600);
        self.dream_task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                on_tick().await;
            }
        }));
    }

    pub fn stop_dream_schedule(&mut self) {
        if let Some(handle) = self.dream_task.take() {
            handle.abort();
        }
    }

    /// Spawns a task that fires `on_tick` once every 24h, aligned to the
    /// next 03:00 UTC boundary (spec.md §4.8).
    pub fn start_decay_schedule(&mut self, on_tick: BoxedTick) {
        self.stop_decay_schedule();
        self.decay_task = Some(tokio::spawn(async move {
            loop {
                let wait = seconds_until_next_3am_utc();
                tokio::time::sleep(StdDuration::from_secs(wait)).await;
                on_tick().await;
            }
        }));
    }

    pub fn stop_decay_schedule(&mut self) {
        if let Some(handle) = self.decay_task.take() {
            handle.abort();
        }
    }

    pub fn stop_all(&mut self) {
        self.stop_dream_schedule();
        self.stop_decay_schedule();
    }

    pub fn dream_schedule_running(&self) -> bool {
        self.dream_task.is_some()
    }

    pub fn decay_schedule_running(&self) -> bool {
        self.decay_task.is_some()
    }
}

impl Drop for DreamScheduler {
    fn drop(&mut self) {
        self.stop_all();
    }
}

fn seconds_until_next_3am_utc() -> u64 {
    let now = Utc::now();
    let mut target = now.date_naive().and_hms_opt(3, 0, 0).unwrap().and_utc();
    if target <= now {
        target += chrono::Duration::days(1);
    }
    (target - now).num_seconds().max(1) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn dream_schedule_ticks_after_the_configured_interval() {
        let mut scheduler = DreamScheduler::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        scheduler.start_dream_schedule(
            1,
            Box::new(move || {
                let counter = Arc::clone(&counter);
                Box::pin(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
            }),
        );

        tokio::time::advance(StdDuration::from_secs(3601)).await;
        tokio::task::yield_now().await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        scheduler.stop_dream_schedule();
        assert!(!scheduler.dream_schedule_running());
    }

    #[test]
    fn next_3am_is_in_the_future_and_at_most_a_day_away() {
        let wait = seconds_until_next_3am_utc();
        assert!(wait > 0);
        assert!(wait <= 24 * 3600);
    }
}
