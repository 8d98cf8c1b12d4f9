// Collection Run Domain Model

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::CollectionError;

/// Highest progress a probe checkpoint can report
pub const PROBE_PROGRESS_CAP: u8 = 99;

/// Run ID (local timestamp, second granularity: `YYYYmmdd_HHMMSS`)
pub type RunId = String;

/// Outcome of one probe inside a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub probe_name: String,
    pub artifact_path: PathBuf,
    pub succeeded: bool,
    pub error_detail: Option<String>,
    pub attempts: u32,
    pub duration_ms: i64,
    /// Not invoked because the run was cancelled first
    pub skipped: bool,
}

impl ProbeResult {
    pub fn success(probe_name: impl Into<String>, artifact_path: PathBuf) -> Self {
        Self {
            probe_name: probe_name.into(),
            artifact_path,
            succeeded: true,
            error_detail: None,
            attempts: 1,
            duration_ms: 0,
            skipped: false,
        }
    }

    pub fn failure(
        probe_name: impl Into<String>,
        artifact_path: PathBuf,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            probe_name: probe_name.into(),
            artifact_path,
            succeeded: false,
            error_detail: Some(detail.into()),
            attempts: 1,
            duration_ms: 0,
            skipped: false,
        }
    }

    pub fn skipped(probe_name: impl Into<String>, artifact_path: PathBuf) -> Self {
        Self {
            attempts: 0,
            skipped: true,
            ..Self::failure(probe_name, artifact_path, "skipped: cancelled")
        }
    }
}

/// Terminal state of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Still owned by the orchestrator
    Pending,
    /// Bundle written next to the output directory
    Archived { archive_path: PathBuf },
    /// Setup or archival failed; the stage is on the error
    Failed(CollectionError),
}

/// One end-to-end execution of the orchestrator
#[derive(Debug, Clone)]
pub struct CollectionRun {
    pub run_id: RunId,
    pub output_directory: PathBuf,
    pub results: Vec<ProbeResult>,
    pub progress: u8,
    pub cancelled: bool,
    pub outcome: RunOutcome,
}

impl CollectionRun {
    pub fn new(run_id: impl Into<RunId>, output_directory: PathBuf) -> Self {
        Self {
            run_id: run_id.into(),
            output_directory,
            results: Vec::new(),
            progress: 0,
            cancelled: false,
            outcome: RunOutcome::Pending,
        }
    }

    /// Move progress forward. Never goes backwards.
    ///
    /// Probe checkpoints stop at 99; only `complete` reaches 100.
    /// Returns the progress after the update.
    pub fn advance(&mut self, checkpoint: u8) -> u8 {
        self.progress = self.progress.max(checkpoint.min(PROBE_PROGRESS_CAP));
        self.progress
    }

    pub fn record(&mut self, result: ProbeResult) {
        self.results.push(result);
    }

    pub fn complete(&mut self, archive_path: PathBuf) {
        self.progress = 100;
        self.outcome = RunOutcome::Archived { archive_path };
    }

    pub fn fail(&mut self, error: CollectionError) {
        self.outcome = RunOutcome::Failed(error);
    }

    /// True when setup failed and nothing was collected
    pub fn is_abandoned(&self) -> bool {
        matches!(
            self.outcome,
            RunOutcome::Failed(CollectionError::Setup { .. })
        )
    }

    pub fn archive_path(&self) -> Option<&Path> {
        match &self.outcome {
            RunOutcome::Archived { archive_path } => Some(archive_path),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&CollectionError> {
        match &self.outcome {
            RunOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn succeeded_count(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| !r.succeeded && !r.skipped)
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.results.iter().filter(|r| r.skipped).count()
    }

    /// Collapse into the single terminal result the trigger reports
    pub fn into_result(self) -> Result<PathBuf, CollectionError> {
        match self.outcome {
            RunOutcome::Archived { archive_path } => Ok(archive_path),
            RunOutcome::Failed(e) => Err(e),
            RunOutcome::Pending => Err(CollectionError::Setup {
                path: self.output_directory,
                reason: "run never started".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_never_decreases() {
        let mut run = CollectionRun::new("20260101_120000", PathBuf::from("/tmp/r"));

        assert_eq!(run.advance(10), 10);
        assert_eq!(run.advance(5), 10);
        assert_eq!(run.advance(40), 40);
        assert_eq!(run.advance(250), 99);
    }

    #[test]
    fn test_only_completion_reaches_100() {
        let mut run = CollectionRun::new("20260101_120000", PathBuf::from("/tmp/r"));

        assert_eq!(run.advance(100), 99);
        run.fail(CollectionError::Setup {
            path: PathBuf::from("/tmp/r"),
            reason: "late".to_string(),
        });
        assert_eq!(run.progress, 99);

        run.complete(PathBuf::from("/tmp/r.tar.gz"));
        assert_eq!(run.progress, 100);
    }

    #[test]
    fn test_counts() {
        let mut run = CollectionRun::new("20260101_120000", PathBuf::from("/tmp/r"));
        run.record(ProbeResult::success("a", PathBuf::from("/tmp/r/a.txt")));
        run.record(ProbeResult::failure("b", PathBuf::from("/tmp/r/b.txt"), "exit code 1"));
        run.record(ProbeResult::skipped("c", PathBuf::from("/tmp/r/c.txt")));

        assert_eq!(run.succeeded_count(), 1);
        assert_eq!(run.failed_count(), 1);
        assert_eq!(run.skipped_count(), 1);
        assert_eq!(run.results[2].error_detail.as_deref(), Some("skipped: cancelled"));
    }

    #[test]
    fn test_outcome_transitions() {
        let mut run = CollectionRun::new("20260101_120000", PathBuf::from("/tmp/r"));
        assert!(run.archive_path().is_none());

        run.complete(PathBuf::from("/tmp/r.tar.gz"));
        assert_eq!(run.progress, 100);
        assert_eq!(run.archive_path(), Some(Path::new("/tmp/r.tar.gz")));
        assert_eq!(run.into_result().unwrap(), PathBuf::from("/tmp/r.tar.gz"));
    }

    #[test]
    fn test_setup_failure_is_abandoned() {
        let mut run = CollectionRun::new("20260101_120000", PathBuf::from("/tmp/r"));
        run.fail(CollectionError::Setup {
            path: PathBuf::from("/tmp/r"),
            reason: "exists".to_string(),
        });

        assert!(run.is_abandoned());
        assert_eq!(run.progress, 0);
        assert_eq!(run.into_result().unwrap_err().stage(), "setup");
    }
}
