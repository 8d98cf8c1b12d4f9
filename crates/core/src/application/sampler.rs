// Metrics Sampler - one best-effort snapshot of host vitals

use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::domain::{MetricsSample, Reading};
use crate::port::{HostIdentity, SampleFault, TelemetrySource, TimeProvider};

/// Builds a `MetricsSample`; every field degrades independently
pub struct MetricsSampler {
    telemetry: Option<Arc<dyn TelemetrySource>>,
    identity: Arc<dyn HostIdentity>,
    clock: Arc<dyn TimeProvider>,
    disk_mount: PathBuf,
}

impl MetricsSampler {
    pub fn new(
        telemetry: Option<Arc<dyn TelemetrySource>>,
        identity: Arc<dyn HostIdentity>,
        clock: Arc<dyn TimeProvider>,
        disk_mount: impl Into<PathBuf>,
    ) -> Self {
        Self {
            telemetry,
            identity,
            clock,
            disk_mount: disk_mount.into(),
        }
    }

    pub async fn sample(&self) -> MetricsSample {
        let sampled_at = self.clock.now();

        let (cpu_percent, mem_percent, disk_percent, temperature_celsius) = match &self.telemetry {
            Some(t) => (
                Reading::from(t.cpu_percent().await),
                Reading::from(t.memory().await.and_then(|m| {
                    if m.total_bytes == 0 {
                        Err(SampleFault::Failed("total memory reported as zero".into()))
                    } else {
                        Ok(m.used_percent() as f32)
                    }
                })),
                Reading::from(t.disk_percent(&self.disk_mount).await),
                Reading::from(t.temperature_celsius().await),
            ),
            None => {
                let missing = SampleFault::SourceUnavailable.to_string();
                (
                    Reading::unavailable(missing.clone()),
                    Reading::unavailable(missing.clone()),
                    Reading::unavailable(missing.clone()),
                    Reading::unavailable(missing),
                )
            }
        };

        let hostname = self.identity.hostname();
        let ip_address = match &hostname {
            Ok(name) => Reading::from(self.identity.resolve(name).await),
            Err(_) => Reading::unavailable("hostname unavailable"),
        };

        let sample = MetricsSample {
            sampled_at,
            cpu_percent,
            mem_percent,
            disk_percent,
            temperature_celsius,
            hostname: Reading::from(hostname),
            ip_address,
        };
        debug!(unavailable = sample.unavailable_fields(), "Metrics sampled");
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::telemetry::mocks::{MockHostIdentity, MockTelemetry};
    use crate::port::time_provider::mocks::SteppingClock;
    use std::net::{IpAddr, Ipv4Addr};

    fn sampler(telemetry: Option<MockTelemetry>, identity: MockHostIdentity) -> MetricsSampler {
        MetricsSampler::new(
            telemetry.map(|t| Arc::new(t) as Arc<dyn TelemetrySource>),
            Arc::new(identity),
            Arc::new(SteppingClock::default_start()),
            "/",
        )
    }

    #[tokio::test]
    async fn test_full_sample() {
        let sample = sampler(Some(MockTelemetry::new()), MockHostIdentity::new("desk-01"))
            .sample()
            .await;

        assert_eq!(sample.cpu_percent, Reading::Available(12.5));
        assert_eq!(sample.mem_percent, Reading::Available(50.0));
        assert_eq!(sample.disk_percent, Reading::Available(40.0));
        assert_eq!(sample.temperature_celsius, Reading::Available(48.0));
        assert_eq!(sample.hostname, Reading::Available("desk-01".to_string()));
        assert_eq!(sample.ip_address, Reading::Available(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 42))));
        assert_eq!(sample.unavailable_fields(), 0);
    }

    #[tokio::test]
    async fn test_missing_temperature_degrades_one_field() {
        let telemetry = MockTelemetry::new().with_temperature(Err(SampleFault::NoSensor("temperature sensor".into())));
        let sample = sampler(Some(telemetry), MockHostIdentity::new("desk-01")).sample().await;

        assert_eq!(
            sample.temperature_celsius,
            Reading::Unavailable("no temperature sensor reported by this host".to_string())
        );
        assert_eq!(sample.unavailable_fields(), 1);
        assert!(sample.cpu_percent.is_available());
        assert!(sample.ip_address.is_available());
    }

    #[tokio::test]
    async fn test_no_telemetry_keeps_host_fields() {
        let sample = sampler(None, MockHostIdentity::new("desk-01")).sample().await;

        assert!(!sample.cpu_percent.is_available());
        assert!(!sample.temperature_celsius.is_available());
        assert!(sample.hostname.is_available());
        assert!(sample.ip_address.is_available());
    }

    #[tokio::test]
    async fn test_unresolvable_hostname() {
        let identity = MockHostIdentity::new("desk-01").with_address(Err(SampleFault::Failed("lookup failed".into())));
        let sample = sampler(Some(MockTelemetry::new()), identity).sample().await;

        assert_eq!(sample.ip_address, Reading::Unavailable("lookup failed".to_string()));
        assert!(sample.hostname.is_available());
    }
}
