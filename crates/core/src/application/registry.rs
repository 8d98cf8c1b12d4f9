//! Probe Registry - the ordered list of diagnostic operations
//!
//! The registry is the single extension point: adding or removing a probe
//! is a change to `standard_probes` only, never to the orchestrator.
//! Order is execution order and only matters for progress pacing.

use std::collections::HashSet;

use crate::domain::{DerivedMetric, DomainError, Probe, ShellCommand};

/// Validated, immutable probe list
#[derive(Debug, Clone)]
pub struct ProbeRegistry {
    probes: Vec<Probe>,
}

impl ProbeRegistry {
    /// Build a registry, rejecting lists that would break run invariants
    ///
    /// # Errors
    /// - duplicate probe or artifact names
    /// - artifact names that are not plain file names
    /// - checkpoints above 100 or going backwards
    pub fn new(probes: Vec<Probe>) -> Result<Self, DomainError> {
        let mut names = HashSet::new();
        let mut artifacts = HashSet::new();
        let mut previous = 0u8;

        for probe in &probes {
            if !names.insert(probe.name.as_str()) {
                return Err(DomainError::DuplicateProbe(probe.name.clone()));
            }
            if !is_plain_file_name(&probe.artifact_name) {
                return Err(DomainError::InvalidArtifactName {
                    probe: probe.name.clone(),
                    artifact: probe.artifact_name.clone(),
                });
            }
            if !artifacts.insert(probe.artifact_name.as_str()) {
                return Err(DomainError::DuplicateArtifact(probe.artifact_name.clone()));
            }
            if probe.checkpoint > 100 {
                return Err(DomainError::CheckpointOutOfRange {
                    probe: probe.name.clone(),
                    checkpoint: probe.checkpoint,
                });
            }
            if probe.checkpoint < previous {
                return Err(DomainError::CheckpointDecreasing {
                    probe: probe.name.clone(),
                    previous,
                    checkpoint: probe.checkpoint,
                });
            }
            previous = probe.checkpoint;
        }

        Ok(Self { probes })
    }

    /// The built-in helpdesk probe set for this platform
    pub fn standard() -> Self {
        Self {
            probes: standard_probes(),
        }
    }

    /// Probes in execution order
    pub fn all(&self) -> &[Probe] {
        &self.probes
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', ':'])
}

fn event_query(log: &str, xpath: &str, count: u32) -> String {
    format!("wevtutil qe {log} /q:\"{xpath}\" /c:{count} /rd:true /f:text")
}

/// Standard probe list
///
/// Windows hosts get the event-log and Defender queries; elsewhere the
/// closest journal/inventory equivalents run so a bundle is still useful.
pub fn standard_probes() -> Vec<Probe> {
    vec![
        Probe::shelled(
            "Security Log - Logons",
            "security_logons.txt",
            5,
            ShellCommand::for_platform(
                &event_query("Security", "*[System[(EventID=4624)]]", 100),
                "last -n 100",
            ),
        ),
        Probe::shelled(
            "Security Log - Failed Logons",
            "security_failed_logons.txt",
            10,
            ShellCommand::for_platform(
                &event_query("Security", "*[System[(EventID=4625)]]", 100),
                "lastb -n 100",
            ),
        ),
        Probe::shelled(
            "Security Log - Log Cleared",
            "security_log_cleared.txt",
            15,
            ShellCommand::for_platform(
                &event_query("Security", "*[System[(EventID=1102)]]", 50),
                "journalctl -q --no-pager -n 100 -t systemd-journald",
            ),
        ),
        Probe::shelled(
            "Admin Privilege Grants",
            "admin_privilege_events.txt",
            20,
            ShellCommand::for_platform(
                &event_query("Security", "*[System[(EventID=4672)]]", 100),
                "journalctl -q --no-pager -n 200 _COMM=sudo",
            ),
        ),
        Probe::shelled(
            "Hardware Errors (WHEA)",
            "hardware_whea_errors.txt",
            30,
            ShellCommand::for_platform(
                &event_query(
                    "System",
                    "*[System[Provider[@Name='Microsoft-Windows-WHEA-Logger']]]",
                    50,
                ),
                "journalctl -q --no-pager -k -p err -n 200",
            ),
        ),
        Probe::shelled(
            "BugCheck Events",
            "bugcheck_events.txt",
            35,
            ShellCommand::for_platform(
                &event_query("System", "*[System[(EventID=1001)]]", 50),
                "journalctl -q --no-pager -k -n 100 -g panic",
            ),
        ),
        Probe::shelled(
            "Defender Status",
            "defender_status.txt",
            45,
            ShellCommand::for_platform(
                "powershell -NoProfile -Command \"Get-MpComputerStatus | Format-List\"",
                "systemctl status --no-pager clamav-daemon clamav-freshclam",
            ),
        ),
        Probe::shelled(
            "Defender Threat Detections",
            "defender_threats.txt",
            50,
            ShellCommand::for_platform(
                "powershell -NoProfile -Command \"Get-MpThreatDetection | Format-List\"",
                "journalctl -q --no-pager -n 100 -t clamd",
            ),
        ),
        Probe::shelled(
            "System Inventory",
            "systeminfo.txt",
            60,
            ShellCommand::for_platform("systeminfo", "uname -a && cat /etc/os-release && uptime"),
        ),
        Probe::shelled(
            "Network Configuration",
            "ipconfig_all.txt",
            70,
            ShellCommand::for_platform("ipconfig /all", "ip addr && ip route"),
        ),
        Probe::shelled(
            "Running Processes",
            "running_processes.txt",
            78,
            ShellCommand::for_platform("tasklist /v", "ps aux"),
        ),
        Probe::shelled(
            "Storage Devices",
            "disk_drives.txt",
            85,
            ShellCommand::for_platform(
                "wmic diskdrive get Model,SerialNumber,Size,MediaType,Status /format:list",
                "lsblk -o NAME,MODEL,SERIAL,SIZE,TYPE,ROTA",
            ),
        ),
        Probe::derived("Memory Health", "memory_health.txt", 90, DerivedMetric::MemoryHealth),
        Probe::derived("Storage Health", "storage_health.txt", 95, DerivedMetric::StorageHealth),
    ]
}
