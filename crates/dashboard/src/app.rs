// Composition root: adapters wired into application services

use std::sync::Arc;
use tracing::{info, warn};

use helpdesk_core::application::{
    CollectionOrchestrator, CollectionTrigger, MetricsPoller, MetricsSampler, ProbeInvoker,
    ProbeRegistry,
};
use helpdesk_core::port::{
    CommandRunner, HostIdentity, SampleSink, SystemTimeProvider, TelemetrySource, TimeProvider,
};
use helpdesk_infra_system::{ShellCommandRunner, SysinfoTelemetry, SystemHostIdentity, TarGzArchiver};

use crate::config::Settings;

pub struct App {
    pub settings: Settings,
    pub runner: Arc<dyn CommandRunner>,
    pub telemetry: Option<Arc<dyn TelemetrySource>>,
    pub identity: Arc<dyn HostIdentity>,
    pub clock: Arc<dyn TimeProvider>,
    pub trigger: Arc<CollectionTrigger>,
}

impl App {
    pub fn build(settings: Settings) -> Self {
        let clock: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
        let runner: Arc<dyn CommandRunner> = Arc::new(ShellCommandRunner::new());
        let identity: Arc<dyn HostIdentity> = Arc::new(SystemHostIdentity::new());

        let telemetry: Option<Arc<dyn TelemetrySource>> = match SysinfoTelemetry::try_new() {
            Some(t) => Some(Arc::new(t)),
            None => {
                warn!("Telemetry unavailable on this platform, derived metrics will report unavailable");
                None
            }
        };

        let invoker = ProbeInvoker::new(runner.clone(), telemetry.clone())
            .with_timeout(settings.probe_timeout())
            .with_retry(settings.retry_policy());

        let orchestrator = CollectionOrchestrator::new(
            ProbeRegistry::standard(),
            invoker,
            Arc::new(TarGzArchiver::new()),
            clock.clone(),
            settings.output_root.clone(),
        );

        info!(
            output_root = %settings.output_root.display(),
            probes = orchestrator.registry().len(),
            telemetry = telemetry.is_some(),
            "Helpdesk toolkit wired"
        );

        Self {
            trigger: Arc::new(CollectionTrigger::new(Arc::new(orchestrator))),
            settings,
            runner,
            telemetry,
            identity,
            clock,
        }
    }

    pub fn poller(&self, sink: Arc<dyn SampleSink>) -> MetricsPoller {
        let sampler = MetricsSampler::new(
            self.telemetry.clone(),
            self.identity.clone(),
            self.clock.clone(),
            self.settings.disk_mount.clone(),
        );
        MetricsPoller::new(Arc::new(sampler), sink, self.settings.poll_interval())
    }
}
