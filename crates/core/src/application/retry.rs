// Retry logic for shelled probes
use std::time::Duration;
use tracing::{info, warn};

use crate::port::RunnerError;

/// Retry decision result
#[derive(Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try again after the delay
    Retry(Duration),
    /// Do not retry, keep the last outcome
    GiveUp,
}

/// How a probe attempt went wrong
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// The command ran but exited non-zero (e.g. a momentarily locked event log)
    NonZeroExit(Option<i32>),
    /// The command could not run to completion
    Runner(RunnerError),
}

/// Retry policy for transient probe failures
///
/// Default is a single attempt. Timeouts are never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Create a new retry policy
    ///
    /// # Arguments
    /// * `max_attempts` - Total attempts including the first (0 is treated as 1)
    /// * `delay` - Pause between attempts
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// One attempt, no retry
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decide whether to try again after `attempt` (1-based) failed
    pub fn should_retry(&self, probe: &str, attempt: u32, failure: &AttemptFailure) -> RetryDecision {
        if matches!(failure, AttemptFailure::Runner(RunnerError::Timeout(_))) {
            warn!(probe = %probe, attempt = attempt, "Probe timed out, not retrying");
            return RetryDecision::GiveUp;
        }

        if attempt >= self.max_attempts {
            if self.max_attempts > 1 {
                warn!(
                    probe = %probe,
                    attempts = attempt,
                    max_attempts = self.max_attempts,
                    "Max probe attempts reached"
                );
            }
            return RetryDecision::GiveUp;
        }

        info!(
            probe = %probe,
            attempt = attempt,
            max_attempts = self.max_attempts,
            delay_ms = self.delay.as_millis() as u64,
            failure = ?failure,
            "Scheduling probe retry"
        );

        RetryDecision::Retry(self.delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_never_retries() {
        let policy = RetryPolicy::default();
        let decision = policy.should_retry("p", 1, &AttemptFailure::NonZeroExit(Some(5)));
        assert_eq!(decision, RetryDecision::GiveUp);
    }

    #[test]
    fn test_retries_until_max() {
        let policy = RetryPolicy::new(3, Duration::from_millis(50));
        let failure = AttemptFailure::Runner(RunnerError::SpawnFailed("busy".into()));

        assert_eq!(
            policy.should_retry("p", 1, &failure),
            RetryDecision::Retry(Duration::from_millis(50))
        );
        assert_eq!(
            policy.should_retry("p", 2, &failure),
            RetryDecision::Retry(Duration::from_millis(50))
        );
        assert_eq!(policy.should_retry("p", 3, &failure), RetryDecision::GiveUp);
    }

    #[test]
    fn test_timeout_is_not_retried() {
        let policy = RetryPolicy::new(5, Duration::from_millis(1));
        let failure = AttemptFailure::Runner(RunnerError::Timeout(1000));
        assert_eq!(policy.should_retry("p", 1, &failure), RetryDecision::GiveUp);
    }

    #[test]
    fn test_zero_attempts_means_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
    }
}
