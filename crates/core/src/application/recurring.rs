// Recurring task scheduler
// Fixed-interval background loop, stopped through a CancelToken

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use super::cancel::CancelToken;

/// Work performed on every tick
#[async_trait]
pub trait RecurringTask: Send + Sync {
    fn name(&self) -> &str;

    /// One unit of work. Must not fail: errors are folded into whatever it publishes.
    async fn tick(&self);
}

/// Runs a `RecurringTask` every `period` until cancelled
///
/// The first tick fires immediately. A tick that overruns delays the next one
/// instead of bursting to catch up.
pub struct RecurringScheduler {
    task: Arc<dyn RecurringTask>,
    period: Duration,
}

impl RecurringScheduler {
    pub fn new(task: Arc<dyn RecurringTask>, period: Duration) -> Self {
        Self { task, period }
    }

    /// Run loop (background task); returns the number of ticks performed
    ///
    /// Should be spawned in tokio::spawn
    pub async fn run(self, mut cancel: CancelToken) -> u64 {
        info!(task = %self.task.name(), period_ms = self.period.as_millis() as u64, "Recurring task started");

        let mut tick = interval(self.period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut count = 0u64;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tick.tick() => {
                    self.task.tick().await;
                    count += 1;
                    debug!(task = %self.task.name(), tick = count, "Recurring task ticked");
                }
            }
        }

        info!(task = %self.task.name(), ticks = count, "Recurring task stopped");
        count
    }
}
