// Derived-metric probes: artifacts computed from in-process telemetry

use std::fmt::Write;
use tracing::debug;

use super::invoke::ProbeOutput;
use crate::domain::{DerivedMetric, MemoryHealth};
use crate::domain::health::{MEMORY_CRITICAL_PERCENT, MEMORY_WARNING_PERCENT};
use crate::port::{SampleFault, StorageDevice, TelemetrySource};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Produce the artifact text for a derived metric
pub async fn render(metric: DerivedMetric, telemetry: Option<&dyn TelemetrySource>) -> ProbeOutput {
    debug!(metric = %metric, telemetry = telemetry.is_some(), "Rendering derived metric");
    match metric {
        DerivedMetric::MemoryHealth => memory_health(telemetry).await,
        DerivedMetric::StorageHealth => storage_health(telemetry).await,
    }
}

async fn memory_health(telemetry: Option<&dyn TelemetrySource>) -> ProbeOutput {
    let stats = match telemetry {
        Some(t) => t.memory().await,
        None => Err(SampleFault::SourceUnavailable),
    };

    match stats {
        Ok(stats) if stats.total_bytes > 0 => {
            let percent = stats.used_percent();
            let status = MemoryHealth::classify(percent);

            let mut text = String::from("Memory Health\n=============\n");
            let _ = writeln!(text, "Total:      {:.2} GB", stats.total_bytes as f64 / GIB);
            let _ = writeln!(text, "Used:       {:.2} GB", stats.used_bytes as f64 / GIB);
            let _ = writeln!(text, "Available:  {:.2} GB", stats.available_bytes as f64 / GIB);
            let _ = writeln!(text, "Usage:      {:.1}%", percent);
            let _ = writeln!(text, "Status:     {}", status);
            let _ = writeln!(
                text,
                "Thresholds: WARNING >= {:.0}%, CRITICAL >= {:.0}%",
                MEMORY_WARNING_PERCENT, MEMORY_CRITICAL_PERCENT
            );

            ProbeOutput::success(text)
        }
        Ok(_) => unavailable("Memory health", &SampleFault::Failed("total memory reported as zero".into())),
        Err(fault) => unavailable("Memory health", &fault),
    }
}

async fn storage_health(telemetry: Option<&dyn TelemetrySource>) -> ProbeOutput {
    let devices = match telemetry {
        Some(t) => t.storage_devices().await,
        None => Err(SampleFault::SourceUnavailable),
    };

    match devices {
        Ok(devices) if devices.is_empty() => {
            ProbeOutput::success("Storage Health\n==============\nNo storage devices reported.\n")
        }
        Ok(devices) => {
            let mut text = String::from("Storage Health\n==============\n");
            for device in &devices {
                write_device(&mut text, device);
            }
            ProbeOutput::success(text)
        }
        Err(fault) => unavailable("Storage health", &fault),
    }
}

fn write_device(text: &mut String, device: &StorageDevice) {
    let _ = writeln!(text, "Device: {}", device.device_id);
    let _ = writeln!(text, "Model:  {}", blank_as_unknown(&device.model));
    let _ = writeln!(text, "Media:  {}", blank_as_unknown(&device.media_type));
    match device.size_bytes {
        Some(bytes) => {
            let _ = writeln!(text, "Size:   {:.2} GB", bytes as f64 / GIB);
        }
        None => {
            let _ = writeln!(text, "Size:   Unknown");
        }
    }
    let _ = writeln!(text, "Health: {}", blank_as_unknown(&device.health_status));
    text.push('\n');
}

fn blank_as_unknown(s: &str) -> &str {
    if s.trim().is_empty() {
        "Unknown"
    } else {
        s
    }
}

fn unavailable(what: &str, fault: &SampleFault) -> ProbeOutput {
    ProbeOutput::failure(
        format!("{what} unavailable: {fault}\n"),
        format!("{what} unavailable: {fault}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::telemetry::mocks::MockTelemetry;
    use crate::port::MemoryStats;

    #[tokio::test]
    async fn test_memory_health_ok() {
        let telemetry = MockTelemetry::new();
        let out = render(DerivedMetric::MemoryHealth, Some(&telemetry)).await;

        assert!(out.succeeded);
        assert!(out.text.contains("Usage:      50.0%"));
        assert!(out.text.contains("Status:     OK"));
    }

    #[tokio::test]
    async fn test_memory_health_critical() {
        let telemetry = MockTelemetry::new().with_memory(Ok(MemoryStats {
            total_bytes: 100,
            used_bytes: 96,
            available_bytes: 4,
        }));
        let out = render(DerivedMetric::MemoryHealth, Some(&telemetry)).await;

        assert!(out.succeeded);
        assert!(out.text.contains("Status:     CRITICAL"));
    }

    #[tokio::test]
    async fn test_memory_health_without_telemetry() {
        let out = render(DerivedMetric::MemoryHealth, None).await;

        assert!(!out.succeeded);
        assert!(out.text.contains("unavailable"));
        assert!(!out.text.trim().is_empty());
    }

    #[tokio::test]
    async fn test_storage_health_lists_devices() {
        let telemetry = MockTelemetry::new();
        let out = render(DerivedMetric::StorageHealth, Some(&telemetry)).await;

        assert!(out.succeeded);
        assert!(out.text.contains("Device: /dev/nvme0n1"));
        assert!(out.text.contains("Health: OK"));
    }

    #[tokio::test]
    async fn test_storage_health_source_absent_is_explicit() {
        let telemetry =
            MockTelemetry::new().with_devices(Err(SampleFault::NoSensor("storage devices".into())));
        let out = render(DerivedMetric::StorageHealth, Some(&telemetry)).await;

        assert!(!out.succeeded);
        assert!(out.text.starts_with("Storage health unavailable"));
    }

    #[tokio::test]
    async fn test_storage_health_no_devices() {
        let telemetry = MockTelemetry::new().with_devices(Ok(vec![]));
        let out = render(DerivedMetric::StorageHealth, Some(&telemetry)).await;

        assert!(out.succeeded);
        assert!(out.text.contains("No storage devices reported."));
    }
}
