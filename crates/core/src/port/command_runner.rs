// Command Runner Port
// Abstraction for running one external command and capturing its output

use crate::domain::ShellCommand;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result of running a command to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// None when the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// stdout followed by stderr
    pub combined_output: String,
    pub duration_ms: i64,
}

impl CommandOutput {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Conditions that prevented the command from running to completion.
///
/// A non-zero exit is NOT one of these; it is ordinary data on `CommandOutput`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Process timeout after {0}ms")]
    Timeout(i64),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Command Runner trait
///
/// Implementations:
/// - ShellCommandRunner: runs through the platform shell (infra-system)
/// - MockCommandRunner: scripted outputs for tests
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command and wait for it to finish
    ///
    /// # Errors
    /// - RunnerError::SpawnFailed if the shell cannot be started
    /// - RunnerError::Timeout if the command outlives `timeout`
    async fn run(
        &self,
        command: &ShellCommand,
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, RunnerError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock runner behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Exit 0 with the given output
        Success(String),
        /// Exit with the given code and output
        Exit(i32, String),
        /// Fail to spawn with message
        SpawnFail(String),
        /// Time out after N ms
        Timeout(i64),
    }

    /// Mock Command Runner for testing
    ///
    /// Rules are matched in insertion order against the command text
    /// (substring match); unmatched commands get the default behavior.
    pub struct MockCommandRunner {
        default: MockBehavior,
        rules: Vec<(String, MockBehavior)>,
        delay: Option<Duration>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl MockCommandRunner {
        pub fn new(default: MockBehavior) -> Self {
            Self {
                default,
                rules: Vec::new(),
                delay: None,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success("mock output".to_string()))
        }

        pub fn new_spawn_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::SpawnFail(message.into()))
        }

        /// Override behavior for commands containing `pattern`
        pub fn with_rule(mut self, pattern: impl Into<String>, behavior: MockBehavior) -> Self {
            self.rules.push((pattern.into(), behavior));
            self
        }

        /// Sleep before answering each call
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn behavior_for(&self, command: &str) -> MockBehavior {
            self.rules
                .iter()
                .find(|(pattern, _)| command.contains(pattern.as_str()))
                .map(|(_, b)| b.clone())
                .unwrap_or_else(|| self.default.clone())
        }
    }

    #[async_trait]
    impl CommandRunner for MockCommandRunner {
        async fn run(
            &self,
            command: &ShellCommand,
            _timeout: Option<Duration>,
        ) -> Result<CommandOutput, RunnerError> {
            self.calls.lock().unwrap().push(command.as_str().to_string());

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            match self.behavior_for(command.as_str()) {
                MockBehavior::Success(out) => Ok(CommandOutput {
                    exit_code: Some(0),
                    combined_output: out,
                    duration_ms: 5,
                }),
                MockBehavior::Exit(code, out) => Ok(CommandOutput {
                    exit_code: Some(code),
                    combined_output: out,
                    duration_ms: 5,
                }),
                MockBehavior::SpawnFail(msg) => Err(RunnerError::SpawnFailed(msg)),
                MockBehavior::Timeout(ms) => Err(RunnerError::Timeout(ms)),
            }
        }
    }
}
