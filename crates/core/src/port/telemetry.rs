// Host telemetry ports
// reason: async-trait so adapters can hop onto blocking threads
use async_trait::async_trait;
use std::net::IpAddr;
use std::path::Path;
use thiserror::Error;

/// Physical memory snapshot (bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStats {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub available_bytes: u64,
}

impl MemoryStats {
    pub fn used_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        (self.used_bytes as f64 / self.total_bytes as f64) * 100.0
    }
}

/// One attached storage device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageDevice {
    pub device_id: String,
    pub model: String,
    pub media_type: String,
    pub size_bytes: Option<u64>,
    /// Vendor-reported health string, passed through verbatim
    pub health_status: String,
}

/// Static description of the host, for the system-info action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    pub os_name: String,
    pub os_version: String,
    pub kernel_version: String,
    pub cpu_brand: String,
    pub cpu_cores: usize,
    pub total_memory_bytes: u64,
}

/// A single telemetry field could not be read
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SampleFault {
    #[error("telemetry source unavailable")]
    SourceUnavailable,

    #[error("no {0} reported by this host")]
    NoSensor(String),

    #[error("{0}")]
    Failed(String),
}

/// In-process telemetry (CPU, memory, disks, sensors)
///
/// May be entirely absent at startup; callers hold it as
/// `Option<Arc<dyn TelemetrySource>>` and degrade every dependent field.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Global CPU usage since the previous call (0.0 - 100.0)
    async fn cpu_percent(&self) -> Result<f32, SampleFault>;

    async fn memory(&self) -> Result<MemoryStats, SampleFault>;

    /// Used-space percentage of the volume mounted at `mount`
    async fn disk_percent(&self, mount: &Path) -> Result<f32, SampleFault>;

    /// Hottest CPU sensor reading in Celsius
    async fn temperature_celsius(&self) -> Result<f32, SampleFault>;

    async fn storage_devices(&self) -> Result<Vec<StorageDevice>, SampleFault>;

    async fn platform(&self) -> Result<PlatformInfo, SampleFault>;
}

/// Network identity of the local host
#[async_trait]
pub trait HostIdentity: Send + Sync {
    fn hostname(&self) -> Result<String, SampleFault>;

    /// Resolve a hostname to an address (IPv4 preferred)
    async fn resolve(&self, hostname: &str) -> Result<IpAddr, SampleFault>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::net::Ipv4Addr;
    use std::sync::{Arc, Mutex};

    /// Mock TelemetrySource for testing
    pub struct MockTelemetry {
        cpu: Arc<Mutex<Result<f32, SampleFault>>>,
        memory: Result<MemoryStats, SampleFault>,
        disk: Result<f32, SampleFault>,
        temperature: Result<f32, SampleFault>,
        devices: Result<Vec<StorageDevice>, SampleFault>,
    }

    impl MockTelemetry {
        pub fn new() -> Self {
            Self {
                cpu: Arc::new(Mutex::new(Ok(12.5))),
                memory: Ok(MemoryStats {
                    total_bytes: 16 * 1024 * 1024 * 1024,
                    used_bytes: 8 * 1024 * 1024 * 1024,
                    available_bytes: 8 * 1024 * 1024 * 1024,
                }),
                disk: Ok(40.0),
                temperature: Ok(48.0),
                devices: Ok(vec![StorageDevice {
                    device_id: "/dev/nvme0n1".to_string(),
                    model: "Mock NVMe 1TB".to_string(),
                    media_type: "NVMe".to_string(),
                    size_bytes: Some(1_000_204_886_016),
                    health_status: "OK".to_string(),
                }]),
            }
        }

        pub fn with_memory(mut self, memory: Result<MemoryStats, SampleFault>) -> Self {
            self.memory = memory;
            self
        }

        pub fn with_disk(mut self, disk: Result<f32, SampleFault>) -> Self {
            self.disk = disk;
            self
        }

        pub fn with_temperature(mut self, temperature: Result<f32, SampleFault>) -> Self {
            self.temperature = temperature;
            self
        }

        pub fn with_devices(mut self, devices: Result<Vec<StorageDevice>, SampleFault>) -> Self {
            self.devices = devices;
            self
        }

        pub fn set_cpu(&self, cpu: Result<f32, SampleFault>) {
            *self.cpu.lock().unwrap() = cpu;
        }
    }

    impl Default for MockTelemetry {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl TelemetrySource for MockTelemetry {
        async fn cpu_percent(&self) -> Result<f32, SampleFault> {
            self.cpu.lock().unwrap().clone()
        }
        async fn memory(&self) -> Result<MemoryStats, SampleFault> {
            self.memory.clone()
        }
        async fn disk_percent(&self, _mount: &Path) -> Result<f32, SampleFault> {
            self.disk.clone()
        }
        async fn temperature_celsius(&self) -> Result<f32, SampleFault> {
            self.temperature.clone()
        }
        async fn storage_devices(&self) -> Result<Vec<StorageDevice>, SampleFault> {
            self.devices.clone()
        }
        async fn platform(&self) -> Result<PlatformInfo, SampleFault> {
            Ok(PlatformInfo {
                os_name: "MockOS".to_string(),
                os_version: "11.0".to_string(),
                kernel_version: "6.1.0-mock".to_string(),
                cpu_brand: "Mock CPU @ 3.20GHz".to_string(),
                cpu_cores: 8,
                total_memory_bytes: self
                    .memory
                    .as_ref()
                    .map(|m| m.total_bytes)
                    .unwrap_or_default(),
            })
        }
    }

    /// Mock HostIdentity for testing
    pub struct MockHostIdentity {
        hostname: Result<String, SampleFault>,
        address: Result<IpAddr, SampleFault>,
    }

    impl MockHostIdentity {
        pub fn new(hostname: impl Into<String>) -> Self {
            Self {
                hostname: Ok(hostname.into()),
                address: Ok(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 42))),
            }
        }

        pub fn with_address(mut self, address: Result<IpAddr, SampleFault>) -> Self {
            self.address = address;
            self
        }

        pub fn with_hostname(mut self, hostname: Result<String, SampleFault>) -> Self {
            self.hostname = hostname;
            self
        }
    }

    #[async_trait]
    impl HostIdentity for MockHostIdentity {
        fn hostname(&self) -> Result<String, SampleFault> {
            self.hostname.clone()
        }
        async fn resolve(&self, _hostname: &str) -> Result<IpAddr, SampleFault> {
            self.address.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_used_percent() {
        let stats = MemoryStats {
            total_bytes: 200,
            used_bytes: 170,
            available_bytes: 30,
        };
        assert!((stats.used_percent() - 85.0).abs() < f64::EPSILON);

        let empty = MemoryStats {
            total_bytes: 0,
            used_bytes: 0,
            available_bytes: 0,
        };
        assert_eq!(empty.used_percent(), 0.0);
    }
}
