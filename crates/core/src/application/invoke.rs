// Probe invocation: one `(text, succeeded)` contract over shelled and derived probes

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use super::constants::DEFAULT_PROBE_TIMEOUT;
use super::derived;
use super::retry::{AttemptFailure, RetryDecision, RetryPolicy};
use crate::domain::{DerivedMetric, Probe, ProbeKind, ShellCommand};
use crate::port::{CommandOutput, CommandRunner, TelemetrySource};

/// What a probe produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutput {
    /// Raw artifact content (or a placeholder explaining the failure)
    pub text: String,
    pub succeeded: bool,
    pub detail: Option<String>,
    pub attempts: u32,
}

impl ProbeOutput {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            succeeded: true,
            detail: None,
            attempts: 1,
        }
    }

    pub fn failure(text: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            succeeded: false,
            detail: Some(detail.into()),
            attempts: 1,
        }
    }
}

/// Runs probes against the host
///
/// Never returns an error: every fault becomes a failed `ProbeOutput`.
pub struct ProbeInvoker {
    runner: Arc<dyn CommandRunner>,
    telemetry: Option<Arc<dyn TelemetrySource>>,
    timeout: Option<Duration>,
    retry: RetryPolicy,
}

impl ProbeInvoker {
    /// Create an invoker with the default timeout and no retry
    ///
    /// # Arguments
    /// * `runner` - Command runner for shelled probes
    /// * `telemetry` - Telemetry for derived probes; None if unavailable on this host
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        telemetry: Option<Arc<dyn TelemetrySource>>,
    ) -> Self {
        Self {
            runner,
            telemetry,
            timeout: Some(DEFAULT_PROBE_TIMEOUT),
            retry: RetryPolicy::none(),
        }
    }

    /// Per-probe timeout; None disables it
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn invoke(&self, probe: &Probe) -> ProbeOutput {
        match &probe.kind {
            ProbeKind::Shelled(command) => self.run_shelled(&probe.name, command).await,
            ProbeKind::Derived(metric) => self.run_derived(&probe.name, *metric).await,
        }
    }

    /// Derived probes get the same time budget as shelled ones
    async fn run_derived(&self, name: &str, metric: DerivedMetric) -> ProbeOutput {
        let render = derived::render(metric, self.telemetry.as_deref());
        let Some(limit) = self.timeout else {
            return render.await;
        };

        match timeout(limit, render).await {
            Ok(output) => output,
            Err(_) => {
                let ms = limit.as_millis() as i64;
                warn!(probe = %name, metric = %metric, timeout_ms = ms, "Derived probe timed out");
                let detail = format!("timed out after {ms}ms");
                ProbeOutput::failure(format!("[probe failed] {detail}\n"), detail)
            }
        }
    }

    async fn run_shelled(&self, name: &str, command: &ShellCommand) -> ProbeOutput {
        let mut attempt = 1;
        loop {
            debug!(probe = %name, command = %command, attempt = attempt, "Running shelled probe");

            let (output, failure) = match self.runner.run(command, self.timeout).await {
                Ok(out) if out.succeeded() => {
                    return ProbeOutput {
                        attempts: attempt,
                        ..ProbeOutput::success(out.combined_output)
                    };
                }
                Ok(out) => {
                    let exit_code = out.exit_code;
                    (non_zero_exit(out), AttemptFailure::NonZeroExit(exit_code))
                }
                Err(e) => {
                    warn!(probe = %name, error = %e, "Probe could not run");
                    (
                        ProbeOutput::failure(format!("[probe failed] {e}\n"), e.to_string()),
                        AttemptFailure::Runner(e),
                    )
                }
            };

            match self.retry.should_retry(name, attempt, &failure) {
                RetryDecision::Retry(delay) => {
                    sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::GiveUp => {
                    return ProbeOutput {
                        attempts: attempt,
                        ..output
                    };
                }
            }
        }
    }
}

/// A non-zero exit keeps its raw output; only an empty one gets a placeholder
fn non_zero_exit(out: CommandOutput) -> ProbeOutput {
    let detail = match out.exit_code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    };
    let text = if out.combined_output.trim().is_empty() {
        format!("[probe failed] {detail}, no output\n")
    } else {
        out.combined_output
    };
    ProbeOutput::failure(text, detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::command_runner::mocks::{MockBehavior, MockCommandRunner};
    use crate::port::telemetry::mocks::MockTelemetry;
    use crate::port::{MemoryStats, PlatformInfo, SampleFault, StorageDevice};
    use std::path::Path;

    fn shelled(cmd: &str) -> Probe {
        Probe::shelled("Test Probe", "test.txt", 10, ShellCommand::new(cmd))
    }

    #[tokio::test]
    async fn test_success_keeps_raw_output() {
        let runner = Arc::new(MockCommandRunner::new(MockBehavior::Success("raw text".into())));
        let invoker = ProbeInvoker::new(runner, None);

        let out = invoker.invoke(&shelled("anything")).await;
        assert_eq!(out, ProbeOutput::success("raw text"));
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_data_not_error() {
        let runner = Arc::new(MockCommandRunner::new(MockBehavior::Exit(5, "Access is denied.".into())));
        let invoker = ProbeInvoker::new(runner, None);

        let out = invoker.invoke(&shelled("wevtutil")).await;
        assert!(!out.succeeded);
        assert_eq!(out.text, "Access is denied.");
        assert_eq!(out.detail.as_deref(), Some("exit code 5"));
    }

    #[tokio::test]
    async fn test_empty_failure_gets_placeholder() {
        let runner = Arc::new(MockCommandRunner::new(MockBehavior::Exit(1, String::new())));
        let invoker = ProbeInvoker::new(runner, None);

        let out = invoker.invoke(&shelled("x")).await;
        assert_eq!(out.text, "[probe failed] exit code 1, no output\n");
    }

    #[tokio::test]
    async fn test_spawn_failure_becomes_placeholder() {
        let runner = Arc::new(MockCommandRunner::new_spawn_fail("no shell"));
        let invoker = ProbeInvoker::new(runner, None);

        let out = invoker.invoke(&shelled("x")).await;
        assert!(!out.succeeded);
        assert!(out.text.starts_with("[probe failed] Spawn failed: no shell"));
    }

    #[tokio::test]
    async fn test_retry_runs_again() {
        let runner = Arc::new(MockCommandRunner::new(MockBehavior::Exit(1, "locked".into())));
        let invoker = ProbeInvoker::new(runner.clone(), None)
            .with_retry(RetryPolicy::new(3, Duration::from_millis(1)));

        let out = invoker.invoke(&shelled("x")).await;
        assert_eq!(out.attempts, 3);
        assert_eq!(runner.call_count(), 3);
    }

    #[tokio::test]
    async fn test_timeout_is_not_retried() {
        let runner = Arc::new(MockCommandRunner::new(MockBehavior::Timeout(1000)));
        let invoker = ProbeInvoker::new(runner.clone(), None)
            .with_retry(RetryPolicy::new(3, Duration::from_millis(1)));

        let out = invoker.invoke(&shelled("x")).await;
        assert_eq!(out.attempts, 1);
        assert_eq!(runner.call_count(), 1);
        assert_eq!(out.detail.as_deref(), Some("Process timeout after 1000ms"));
    }

    #[tokio::test]
    async fn test_derived_probe_skips_runner() {
        let runner = Arc::new(MockCommandRunner::new_success());
        let telemetry: Arc<dyn TelemetrySource> = Arc::new(MockTelemetry::new());
        let invoker = ProbeInvoker::new(runner.clone(), Some(telemetry));

        let probe = Probe::derived("Memory Health", "memory_health.txt", 90, DerivedMetric::MemoryHealth);
        let out = invoker.invoke(&probe).await;

        assert!(out.succeeded);
        assert_eq!(runner.call_count(), 0);
    }

    /// Telemetry whose calls never resolve
    struct StalledTelemetry;

    #[async_trait::async_trait]
    impl TelemetrySource for StalledTelemetry {
        async fn cpu_percent(&self) -> Result<f32, SampleFault> {
            std::future::pending().await
        }
        async fn memory(&self) -> Result<MemoryStats, SampleFault> {
            std::future::pending().await
        }
        async fn disk_percent(&self, _mount: &Path) -> Result<f32, SampleFault> {
            std::future::pending().await
        }
        async fn temperature_celsius(&self) -> Result<f32, SampleFault> {
            std::future::pending().await
        }
        async fn storage_devices(&self) -> Result<Vec<StorageDevice>, SampleFault> {
            std::future::pending().await
        }
        async fn platform(&self) -> Result<PlatformInfo, SampleFault> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_derived_probe_times_out() {
        let telemetry: Arc<dyn TelemetrySource> = Arc::new(StalledTelemetry);
        let invoker = ProbeInvoker::new(Arc::new(MockCommandRunner::new_success()), Some(telemetry))
            .with_timeout(Some(Duration::from_millis(100)));

        let probe = Probe::derived("Storage Health", "storage_health.txt", 95, DerivedMetric::StorageHealth);
        let out = tokio::time::timeout(Duration::from_secs(2), invoker.invoke(&probe))
            .await
            .expect("derived probe must honour the probe timeout");

        assert!(!out.succeeded);
        assert_eq!(out.detail.as_deref(), Some("timed out after 100ms"));
        assert_eq!(out.text, "[probe failed] timed out after 100ms\n");
    }
}
