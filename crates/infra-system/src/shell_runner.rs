// Shell command runner
// reason: tokio::process so a slow probe never blocks the runtime; nix for graceful kill
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use helpdesk_core::application::constants::GRACEFUL_SHUTDOWN_TIMEOUT_MS;
use helpdesk_core::domain::ShellCommand;
use helpdesk_core::port::{CommandOutput, CommandRunner, RunnerError};

/// Runs probe command lines through the platform shell
///
/// `cmd /C` on Windows, `sh -c` elsewhere. The child inherits the full
/// environment; stdout and stderr are captured and concatenated.
#[derive(Debug, Default, Clone)]
pub struct ShellCommandRunner;

impl ShellCommandRunner {
    pub fn new() -> Self {
        Self
    }

    fn build(command: &ShellCommand) -> Command {
        #[cfg(windows)]
        let mut cmd = {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(command.as_str());
            cmd
        };

        #[cfg(unix)]
        let mut cmd = {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(command.as_str());
            // own process group so a timeout can take the whole pipeline down
            cmd.process_group(0);
            cmd
        };

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Terminate a timed-out child: SIGTERM, grace period, then SIGKILL
    ///
    /// `pid` is taken at spawn time: the shell may already be reaped while
    /// background members of its group still hold the output pipes.
    #[cfg(unix)]
    async fn kill_graceful(child: &mut Child, pid: Option<u32>) {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        let Some(pid) = pid else {
            return;
        };
        let group = Pid::from_raw(pid as i32);

        info!(pid = pid, "Sending SIGTERM for graceful shutdown");
        if let Err(e) = killpg(group, Signal::SIGTERM) {
            warn!(pid = pid, error = %e, "SIGTERM failed");
        }

        let grace = Duration::from_millis(GRACEFUL_SHUTDOWN_TIMEOUT_MS as u64);
        if timeout(grace, child.wait()).await.is_ok() {
            info!(pid = pid, "Process exited gracefully after SIGTERM");
            return;
        }

        warn!(pid = pid, "Process did not exit after SIGTERM, sending SIGKILL");
        if let Err(e) = killpg(group, Signal::SIGKILL) {
            warn!(pid = pid, error = %e, "SIGKILL failed");
        }
        let _ = child.wait().await;
    }

    /// Windows: taskkill the whole tree
    #[cfg(windows)]
    async fn kill_graceful(child: &mut Child, pid: Option<u32>) {
        if let Some(pid) = pid {
            info!(pid = pid, "Killing process tree on Windows");
            let status = Command::new("taskkill")
                .args(["/F", "/T", "/PID", &pid.to_string()])
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await;
            if let Err(e) = status {
                warn!(pid = pid, error = %e, "taskkill failed");
            }
        }
        let _ = child.start_kill();
        let _ = child.wait().await;
    }
}

fn drain<R>(pipe: Option<R>) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf).await;
        }
        buf
    })
}

#[async_trait]
impl CommandRunner for ShellCommandRunner {
    async fn run(
        &self,
        command: &ShellCommand,
        limit: Option<Duration>,
    ) -> Result<CommandOutput, RunnerError> {
        let started = Instant::now();
        debug!(command = %command, timeout_ms = ?limit.map(|d| d.as_millis()), "Spawning shell command");

        let mut child = Self::build(command)
            .spawn()
            .map_err(|e| RunnerError::SpawnFailed(e.to_string()))?;

        let pid = child.id();
        let mut stdout = drain(child.stdout.take());
        let mut stderr = drain(child.stderr.take());

        // one deadline covers the exit and the pipes closing
        let finished = async {
            let status = child.wait().await?;
            let mut combined = (&mut stdout).await.unwrap_or_default();
            combined.extend((&mut stderr).await.unwrap_or_default());
            Ok::<_, std::io::Error>((status, combined))
        };
        let outcome = match limit {
            Some(limit) => timeout(limit, finished).await.ok(),
            None => Some(finished.await),
        };

        let (status, combined) = match outcome {
            Some(result) => result.map_err(|e| RunnerError::IoError(e.to_string()))?,
            None => {
                let limit_ms = limit.map(|l| l.as_millis() as i64).unwrap_or_default();
                warn!(command = %command, timeout_ms = limit_ms, "Shell command timed out");
                Self::kill_graceful(&mut child, pid).await;
                stdout.abort();
                stderr.abort();
                return Err(RunnerError::Timeout(limit_ms));
            }
        };

        let output = CommandOutput {
            exit_code: status.code(),
            combined_output: String::from_utf8_lossy(&combined).into_owned(),
            duration_ms: started.elapsed().as_millis() as i64,
        };

        info!(
            command = %command,
            duration_ms = output.duration_ms,
            exit_code = ?output.exit_code,
            "Shell command completed"
        );
        Ok(output)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_success() {
        let out = ShellCommandRunner::new()
            .run(&ShellCommand::new("echo hello"), Some(Duration::from_secs(5)))
            .await
            .unwrap();

        assert!(out.succeeded());
        assert_eq!(out.combined_output, "hello\n");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_output() {
        let out = ShellCommandRunner::new()
            .run(&ShellCommand::new("echo denied >&2; exit 3"), None)
            .await
            .unwrap();

        assert_eq!(out.exit_code, Some(3));
        assert_eq!(out.combined_output, "denied\n");
    }

    #[tokio::test]
    async fn test_stdout_before_stderr() {
        let out = ShellCommandRunner::new()
            .run(&ShellCommand::new("echo err >&2; echo out"), None)
            .await
            .unwrap();

        assert_eq!(out.combined_output, "out\nerr\n");
    }

    #[tokio::test]
    async fn test_missing_command_is_not_a_fault() {
        let out = ShellCommandRunner::new()
            .run(&ShellCommand::new("definitely-not-a-real-command-xyz"), None)
            .await
            .unwrap();

        assert_eq!(out.exit_code, Some(127));
        assert!(!out.combined_output.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let started = Instant::now();
        let result = ShellCommandRunner::new()
            .run(&ShellCommand::new("sleep 10"), Some(Duration::from_millis(100)))
            .await;

        assert_eq!(result, Err(RunnerError::Timeout(100)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_background_child_holding_pipes_times_out() {
        let started = Instant::now();
        let result = ShellCommandRunner::new()
            .run(&ShellCommand::new("sleep 6 & echo hi"), Some(Duration::from_millis(500)))
            .await;

        assert_eq!(result, Err(RunnerError::Timeout(500)));
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}
