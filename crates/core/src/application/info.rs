// Quick info actions (system, network, connectivity)
// Thin wrappers that answer a technician's first questions without a full run.

use std::fmt::Write;
use std::time::Duration;
use tracing::debug;

use super::gateway::parse_default_gateway;
use crate::domain::ShellCommand;
use crate::port::{CommandRunner, HostIdentity, TelemetrySource};

const NOT_AVAILABLE: &str = "N/A";
const PING_TARGET: &str = "8.8.8.8";
const PING_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of the connectivity check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingReport {
    pub reachable: bool,
    pub output: String,
}

pub fn ping_command() -> ShellCommand {
    ShellCommand::for_platform(
        &format!("ping {PING_TARGET} -n 4"),
        &format!("ping -c 4 {PING_TARGET}"),
    )
}

pub fn gateway_command() -> ShellCommand {
    ShellCommand::for_platform("ipconfig", "ip route")
}

/// OS, host, user, CPU and total RAM
pub async fn system_report(
    telemetry: Option<&dyn TelemetrySource>,
    identity: &dyn HostIdentity,
    user: Option<&str>,
) -> String {
    let platform = match telemetry {
        Some(t) => t.platform().await.ok(),
        None => None,
    };
    let hostname = identity.hostname().unwrap_or_else(|_| NOT_AVAILABLE.to_string());

    let mut text = String::new();
    match &platform {
        Some(p) => {
            let _ = writeln!(text, "OS: {} {}", p.os_name, p.os_version);
            let _ = writeln!(text, "Version: {}", p.kernel_version);
        }
        None => {
            let _ = writeln!(text, "OS: {}", std::env::consts::OS);
            let _ = writeln!(text, "Version: {NOT_AVAILABLE}");
        }
    }
    let _ = writeln!(text, "Computer Name: {hostname}");
    if let Some(user) = user {
        let _ = writeln!(text, "User: {user}");
    }
    match &platform {
        Some(p) if !p.cpu_brand.trim().is_empty() => {
            let _ = writeln!(text, "CPU: {} ({} cores)", p.cpu_brand.trim(), p.cpu_cores);
        }
        _ => {
            let _ = writeln!(text, "CPU: {NOT_AVAILABLE}");
        }
    }
    if let Some(p) = platform.as_ref().filter(|p| p.total_memory_bytes > 0) {
        let gb = p.total_memory_bytes as f64 / (1024.0 * 1024.0 * 1024.0);
        let _ = writeln!(text, "RAM: {gb:.2} GB (total)");
    }
    text
}

/// Hostname, resolved address and default gateway
pub async fn network_report(runner: &dyn CommandRunner, identity: &dyn HostIdentity) -> String {
    let hostname = identity.hostname().ok();
    let address = match &hostname {
        Some(name) => identity
            .resolve(name)
            .await
            .map(|ip| ip.to_string())
            .unwrap_or_else(|_| NOT_AVAILABLE.to_string()),
        None => NOT_AVAILABLE.to_string(),
    };

    let gateway = match runner.run(&gateway_command(), Some(PING_TIMEOUT)).await {
        Ok(out) => parse_default_gateway(&out.combined_output),
        Err(e) => {
            debug!(error = %e, "Gateway lookup failed");
            None
        }
    };

    format!(
        "Hostname: {}\nIP Address: {}\nDefault Gateway: {}\n",
        hostname.as_deref().unwrap_or(NOT_AVAILABLE),
        address,
        gateway.as_deref().unwrap_or(NOT_AVAILABLE),
    )
}

/// Four echo requests to a public resolver
pub async fn ping(runner: &dyn CommandRunner) -> PingReport {
    match runner.run(&ping_command(), Some(PING_TIMEOUT)).await {
        Ok(out) => PingReport {
            reachable: out.succeeded(),
            output: out.combined_output,
        },
        Err(e) => PingReport {
            reachable: false,
            output: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::command_runner::mocks::{MockBehavior, MockCommandRunner};
    use crate::port::telemetry::mocks::{MockHostIdentity, MockTelemetry};
    use crate::port::SampleFault;

    #[tokio::test]
    async fn test_system_report() {
        let telemetry = MockTelemetry::new();
        let text = system_report(Some(&telemetry), &MockHostIdentity::new("desk-01"), Some("jdoe")).await;

        assert!(text.contains("OS: MockOS 11.0"));
        assert!(text.contains("Computer Name: desk-01"));
        assert!(text.contains("User: jdoe"));
        assert!(text.contains("CPU: Mock CPU @ 3.20GHz (8 cores)"));
        assert!(text.contains("RAM: 16.00 GB (total)"));
    }

    #[tokio::test]
    async fn test_system_report_without_telemetry() {
        let text = system_report(None, &MockHostIdentity::new("desk-01"), None).await;

        assert!(text.contains("CPU: N/A"));
        assert!(!text.contains("RAM:"));
        assert!(!text.contains("User:"));
    }

    #[tokio::test]
    async fn test_network_report() {
        let runner = MockCommandRunner::new(MockBehavior::Success(
            "   Default Gateway . . . . . . . . . : 192.168.1.1\n".into(),
        ));
        let text = network_report(&runner, &MockHostIdentity::new("desk-01")).await;

        assert_eq!(
            text,
            "Hostname: desk-01\nIP Address: 10.0.0.42\nDefault Gateway: 192.168.1.1\n"
        );
    }

    #[tokio::test]
    async fn test_network_report_degrades() {
        let runner = MockCommandRunner::new_spawn_fail("no shell");
        let identity = MockHostIdentity::new("desk-01").with_address(Err(SampleFault::Failed("nx".into())));
        let text = network_report(&runner, &identity).await;

        assert!(text.contains("IP Address: N/A"));
        assert!(text.contains("Default Gateway: N/A"));
    }

    #[tokio::test]
    async fn test_ping_failure_keeps_output() {
        let runner = MockCommandRunner::new(MockBehavior::Exit(1, "Request timed out.".into()));
        let report = ping(&runner).await;

        assert!(!report.reachable);
        assert_eq!(report.output, "Request timed out.");
        assert_eq!(runner.calls(), vec![ping_command().as_str().to_string()]);
    }
}
