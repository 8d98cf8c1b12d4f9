// Live Metrics Poller
//
// Idle -> Polling, then polling for the rest of the session. Runs as its own
// tokio task so a collection run never delays a tick.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

use super::cancel::{cancel_channel, CancelHandle};
use super::recurring::{RecurringScheduler, RecurringTask};
use super::sampler::MetricsSampler;
use crate::error::{AppError, Result};
use crate::port::SampleSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
}

/// Samples host vitals and publishes them on a fixed interval
pub struct MetricsPoller {
    sampler: Arc<MetricsSampler>,
    sink: Arc<dyn SampleSink>,
    interval: Duration,
    running: Mutex<Option<PollerHandle>>,
}

struct PollerHandle {
    cancel: CancelHandle,
    join: JoinHandle<u64>,
}

struct PublishTick {
    sampler: Arc<MetricsSampler>,
    sink: Arc<dyn SampleSink>,
}

#[async_trait]
impl RecurringTask for PublishTick {
    fn name(&self) -> &str {
        "metrics-poller"
    }

    async fn tick(&self) {
        let sample = self.sampler.sample().await;
        self.sink.publish(&sample);
    }
}

impl MetricsPoller {
    pub fn new(sampler: Arc<MetricsSampler>, sink: Arc<dyn SampleSink>, interval: Duration) -> Self {
        Self {
            sampler,
            sink,
            interval,
            running: Mutex::new(None),
        }
    }

    pub async fn state(&self) -> PollerState {
        match &*self.running.lock().await {
            Some(_) => PollerState::Polling,
            None => PollerState::Idle,
        }
    }

    /// Idle -> Polling
    ///
    /// # Errors
    /// - AppError::Busy if the poller is already polling
    pub async fn start(&self) -> Result<()> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return Err(AppError::Busy("metrics poller already running".to_string()));
        }

        let task = Arc::new(PublishTick {
            sampler: self.sampler.clone(),
            sink: self.sink.clone(),
        });
        let (cancel, token) = cancel_channel();
        let join = tokio::spawn(RecurringScheduler::new(task, self.interval).run(token));

        info!(interval_ms = self.interval.as_millis() as u64, "Metrics poller started");
        *running = Some(PollerHandle { cancel, join });
        Ok(())
    }

    /// Stop polling at session end; returns the number of ticks published
    pub async fn stop(&self) -> u64 {
        let handle = self.running.lock().await.take();
        match handle {
            Some(PollerHandle { cancel, join }) => {
                cancel.cancel();
                join.await.unwrap_or_default()
            }
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::observer::mocks::RecordingObserver;
    use crate::port::telemetry::mocks::{MockHostIdentity, MockTelemetry};
    use crate::port::time_provider::SystemTimeProvider;
    use crate::port::TelemetrySource;

    fn poller(sink: Arc<RecordingObserver>) -> MetricsPoller {
        let telemetry: Arc<dyn TelemetrySource> = Arc::new(MockTelemetry::new());
        let sampler = MetricsSampler::new(
            Some(telemetry),
            Arc::new(MockHostIdentity::new("desk-01")),
            Arc::new(SystemTimeProvider),
            "/",
        );
        MetricsPoller::new(Arc::new(sampler), sink, Duration::from_secs(1))
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_polling_idle() {
        let sink = Arc::new(RecordingObserver::new());
        let poller = poller(sink.clone());
        assert_eq!(poller.state().await, PollerState::Idle);

        poller.start().await.unwrap();
        assert_eq!(poller.state().await, PollerState::Polling);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let ticks = poller.stop().await;

        assert_eq!(ticks, 3);
        assert_eq!(sink.samples().len(), 3);
        assert_eq!(poller.state().await, PollerState::Idle);
    }

    #[tokio::test]
    async fn test_double_start_rejected() {
        let poller = poller(Arc::new(RecordingObserver::new()));
        poller.start().await.unwrap();

        assert!(matches!(poller.start().await, Err(AppError::Busy(_))));
        poller.stop().await;
    }

    #[tokio::test]
    async fn test_stop_when_idle() {
        let poller = poller(Arc::new(RecordingObserver::new()));
        assert_eq!(poller.stop().await, 0);
    }
}
