// Telemetry source backed by sysinfo
// reason: sysinfo for cross-platform CPU/memory/disk/sensor readings
use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use sysinfo::{Components, DiskKind, Disks, System};
use tracing::{debug, warn};

use helpdesk_core::port::{MemoryStats, PlatformInfo, SampleFault, StorageDevice, TelemetrySource};

/// Sensor labels that identify a CPU package/core temperature
const CPU_SENSOR_LABELS: [&str; 4] = ["cpu", "tctl", "coretemp", "package"];

/// Upper bound for one `smartctl -H` call
const SMARTCTL_TIMEOUT: Duration = Duration::from_secs(10);

/// Live host telemetry
///
/// Holds one `System` so CPU usage is measured between consecutive calls.
pub struct SysinfoTelemetry {
    system: Arc<Mutex<System>>,
}

impl SysinfoTelemetry {
    /// None when sysinfo has no backend for this OS
    ///
    /// # Example
    /// ```ignore
    /// let telemetry: Option<Arc<dyn TelemetrySource>> =
    ///     SysinfoTelemetry::try_new().map(|t| Arc::new(t) as _);
    /// ```
    pub fn try_new() -> Option<Self> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return None;
        }

        let mut system = System::new();
        // baseline for the first usage delta
        system.refresh_cpu();
        system.refresh_memory();
        Some(Self {
            system: Arc::new(Mutex::new(system)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, System>, SampleFault> {
        self.system
            .lock()
            .map_err(|_| SampleFault::Failed("telemetry state poisoned".to_string()))
    }
}

#[async_trait]
impl TelemetrySource for SysinfoTelemetry {
    async fn cpu_percent(&self) -> Result<f32, SampleFault> {
        let mut sys = self.lock()?;
        sys.refresh_cpu();
        Ok(sys.global_cpu_info().cpu_usage().clamp(0.0, 100.0))
    }

    async fn memory(&self) -> Result<MemoryStats, SampleFault> {
        let mut sys = self.lock()?;
        sys.refresh_memory();

        let total_bytes = sys.total_memory();
        if total_bytes == 0 {
            return Err(SampleFault::NoSensor("physical memory size".to_string()));
        }
        Ok(MemoryStats {
            total_bytes,
            used_bytes: sys.used_memory(),
            available_bytes: sys.available_memory(),
        })
    }

    async fn disk_percent(&self, mount: &Path) -> Result<f32, SampleFault> {
        let mount = mount.to_path_buf();
        blocking("disk enumeration", move || disk_usage(&mount)).await?
    }

    async fn temperature_celsius(&self) -> Result<f32, SampleFault> {
        blocking("sensor enumeration", hottest_cpu_sensor).await?
    }

    async fn storage_devices(&self) -> Result<Vec<StorageDevice>, SampleFault> {
        #[allow(unused_mut)]
        let mut devices = blocking("storage enumeration", list_storage_devices).await??;

        #[cfg(target_os = "linux")]
        {
            for device in &mut devices {
                device.health_status = smart_health(&device.device_id).await;
            }
        }
        Ok(devices)
    }

    async fn platform(&self) -> Result<PlatformInfo, SampleFault> {
        let mut sys = self.lock()?;
        sys.refresh_cpu();
        sys.refresh_memory();

        Ok(PlatformInfo {
            os_name: System::name().unwrap_or_else(|| "Unknown".into()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".into()),
            kernel_version: System::kernel_version().unwrap_or_else(|| "Unknown".into()),
            cpu_brand: sys
                .cpus()
                .first()
                .map(|c| c.brand().to_string())
                .unwrap_or_default(),
            cpu_cores: sys.cpus().len(),
            total_memory_bytes: sys.total_memory(),
        })
    }
}

/// sysinfo walks /proc, /sys and mount tables synchronously
async fn blocking<T, F>(what: &str, f: F) -> Result<T, SampleFault>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SampleFault::Failed(format!("{what} aborted: {e}")))
}

fn disk_usage(mount: &Path) -> Result<f32, SampleFault> {
    let disks = Disks::new_with_refreshed_list();
    let disk = disks
        .list()
        .iter()
        .find(|d| d.mount_point() == mount)
        .ok_or_else(|| SampleFault::NoSensor(format!("volume mounted at {}", mount.display())))?;

    let total = disk.total_space();
    if total == 0 {
        return Err(SampleFault::Failed(format!("{} reports zero capacity", mount.display())));
    }
    let used = total.saturating_sub(disk.available_space());
    Ok((used as f64 / total as f64 * 100.0) as f32)
}

fn hottest_cpu_sensor() -> Result<f32, SampleFault> {
    let components = Components::new_with_refreshed_list();

    let hottest = components
        .list()
        .iter()
        .filter(|c| {
            let label = c.label().to_lowercase();
            CPU_SENSOR_LABELS.iter().any(|l| label.contains(l))
        })
        .map(|c| c.temperature())
        .filter(|t| t.is_finite() && *t > 0.0)
        .fold(None, |hottest: Option<f32>, t| Some(hottest.map_or(t, |h| h.max(t))));

    debug!(sensors = components.list().len(), cpu_temp = ?hottest, "Temperature sensors read");
    hottest.ok_or_else(|| SampleFault::NoSensor("CPU temperature sensor".to_string()))
}

#[cfg(target_os = "linux")]
async fn smart_health(device_id: &str) -> String {
    let mut command = tokio::process::Command::new("smartctl");
    command.args(["-H", device_id]);
    health_check(command, SMARTCTL_TIMEOUT).await
}

/// Run a health tool with a hard deadline; the child is killed if it overruns
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
async fn health_check(mut command: tokio::process::Command, limit: Duration) -> String {
    command
        .stdin(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .kill_on_drop(true);

    match tokio::time::timeout(limit, command.output()).await {
        Ok(Ok(output)) => smart_verdict(&String::from_utf8_lossy(&output.stdout)),
        Ok(Err(_)) => "Unknown (smartctl not installed)".to_string(),
        Err(_) => {
            warn!(timeout_ms = limit.as_millis() as u64, "Storage health check timed out");
            "Unknown (smartctl timed out)".to_string()
        }
    }
}

/// Block devices from /sys/block; health is filled in afterwards
#[cfg(target_os = "linux")]
fn list_storage_devices() -> Result<Vec<StorageDevice>, SampleFault> {
    use std::fs;

    let entries = fs::read_dir("/sys/block")
        .map_err(|e| SampleFault::Failed(format!("cannot read /sys/block: {e}")))?;

    let mut devices = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with("loop") || name.starts_with("ram") || name.starts_with("dm-") || name.starts_with("zram") {
            continue;
        }

        let read = |rel: &str| {
            fs::read_to_string(format!("/sys/block/{name}/{rel}"))
                .unwrap_or_default()
                .trim()
                .to_string()
        };

        let model = read("device/model");
        let media_type = if name.starts_with("nvme") || model.to_lowercase().contains("nvme") {
            "NVMe"
        } else if read("queue/rotational") == "1" {
            "HDD"
        } else {
            "SSD"
        };
        // size is in 512-byte sectors regardless of the device's block size
        let size_bytes = read("size").parse::<u64>().ok().map(|sectors| sectors * 512);

        devices.push(StorageDevice {
            device_id: format!("/dev/{name}"),
            model,
            media_type: media_type.to_string(),
            size_bytes,
            health_status: "Unknown".to_string(),
        });
    }

    devices.sort_by(|a, b| a.device_id.cmp(&b.device_id));
    Ok(devices)
}

/// Mounted volumes; sysinfo has no vendor health field here
#[cfg(not(target_os = "linux"))]
fn list_storage_devices() -> Result<Vec<StorageDevice>, SampleFault> {
    let disks = Disks::new_with_refreshed_list();
    Ok(disks
        .list()
        .iter()
        .map(|d| StorageDevice {
            device_id: d.mount_point().display().to_string(),
            model: d.name().to_string_lossy().to_string(),
            media_type: media_label(d.kind()).to_string(),
            size_bytes: Some(d.total_space()),
            health_status: "Not reported".to_string(),
        })
        .collect())
}

#[cfg_attr(target_os = "linux", allow(dead_code))]
fn media_label(kind: DiskKind) -> &'static str {
    match kind {
        DiskKind::HDD => "HDD",
        DiskKind::SSD => "SSD",
        DiskKind::Unknown(_) => "Unknown",
    }
}

/// Reduce `smartctl -H` output to the overall assessment line
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn smart_verdict(stdout: &str) -> String {
    let verdict = stdout.lines().find_map(|line| {
        let (label, value) = line.split_once(':')?;
        let label = label.to_lowercase();
        (label.contains("overall-health") || label.contains("health status"))
            .then(|| value.trim().to_string())
    });

    match verdict {
        Some(v) if !v.is_empty() => v,
        _ if stdout.contains("PASSED") => "PASSED".to_string(),
        _ if stdout.contains("FAILED") => "FAILED".to_string(),
        _ => "Unknown".to_string(),
    }
}
