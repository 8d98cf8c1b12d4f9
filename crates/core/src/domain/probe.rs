// Probe Domain Model

/// A fixed command line handed to the platform shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand(String);

impl ShellCommand {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Pick the command for the platform this binary was built for
    pub fn for_platform(windows: &str, unix: &str) -> Self {
        if cfg!(windows) {
            Self::new(windows)
        } else {
            Self::new(unix)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metrics computed in-process from telemetry instead of a shelled command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedMetric {
    MemoryHealth,
    StorageHealth,
}

impl std::fmt::Display for DerivedMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DerivedMetric::MemoryHealth => write!(f, "MEMORY_HEALTH"),
            DerivedMetric::StorageHealth => write!(f, "STORAGE_HEALTH"),
        }
    }
}

/// How a probe produces its output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeKind {
    Shelled(ShellCommand),
    Derived(DerivedMetric),
}

/// Registry entry: one named diagnostic operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub name: String,
    pub artifact_name: String,
    pub checkpoint: u8,
    pub kind: ProbeKind,
}

impl Probe {
    pub fn shelled(
        name: impl Into<String>,
        artifact_name: impl Into<String>,
        checkpoint: u8,
        command: ShellCommand,
    ) -> Self {
        Self {
            name: name.into(),
            artifact_name: artifact_name.into(),
            checkpoint,
            kind: ProbeKind::Shelled(command),
        }
    }

    pub fn derived(
        name: impl Into<String>,
        artifact_name: impl Into<String>,
        checkpoint: u8,
        metric: DerivedMetric,
    ) -> Self {
        Self {
            name: name.into(),
            artifact_name: artifact_name.into(),
            checkpoint,
            kind: ProbeKind::Derived(metric),
        }
    }

    pub fn is_derived(&self) -> bool {
        matches!(self.kind, ProbeKind::Derived(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_command_selection() {
        let cmd = ShellCommand::for_platform("ipconfig /all", "ip addr");
        if cfg!(windows) {
            assert_eq!(cmd.as_str(), "ipconfig /all");
        } else {
            assert_eq!(cmd.as_str(), "ip addr");
        }
    }

    #[test]
    fn test_probe_constructors() {
        let shelled = Probe::shelled("System Info", "systeminfo.txt", 40, ShellCommand::new("uname -a"));
        let derived = Probe::derived("Memory Health", "memory_health.txt", 90, DerivedMetric::MemoryHealth);

        assert!(!shelled.is_derived());
        assert!(derived.is_derived());
        assert_eq!(derived.kind, ProbeKind::Derived(DerivedMetric::MemoryHealth));
    }
}
