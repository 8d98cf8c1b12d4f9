// Collection Orchestrator - one end-to-end diagnostic run

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::fs;
use tracing::{error, info, warn};

use super::cancel::CancelToken;
use super::constants::{LOG_LINE_TIME_FORMAT, PROGRESS_DONE, PROGRESS_START, REPORT_DIR_PREFIX, RUN_ID_FORMAT};
use super::invoke::{ProbeInvoker, ProbeOutput};
use super::registry::ProbeRegistry;
use crate::domain::{CollectionRun, Probe, ProbeResult};
use crate::error::CollectionError;
use crate::port::{Archiver, LogSink, ProgressObserver, TimeProvider};

/// Placeholder written for probes a cancelled run never reached
const SKIPPED_PLACEHOLDER: &str = "[skipped: cancelled]\n";

/// Runs every registered probe into a fresh directory, then archives it
///
/// Probe faults are isolated per probe. Only directory creation and
/// archival are run-fatal; both end up on the returned run's outcome.
pub struct CollectionOrchestrator {
    registry: ProbeRegistry,
    invoker: ProbeInvoker,
    archiver: Arc<dyn Archiver>,
    clock: Arc<dyn TimeProvider>,
    output_root: PathBuf,
}

impl CollectionOrchestrator {
    /// Create a new orchestrator
    ///
    /// # Arguments
    /// * `registry` - Probes in execution order
    /// * `invoker` - Runs shelled and derived probes
    /// * `archiver` - Packages the finished directory
    /// * `clock` - Names the run and stamps log lines
    /// * `output_root` - Parent of every `HelpdeskReport_*` directory
    pub fn new(
        registry: ProbeRegistry,
        invoker: ProbeInvoker,
        archiver: Arc<dyn Archiver>,
        clock: Arc<dyn TimeProvider>,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry,
            invoker,
            archiver,
            clock,
            output_root: output_root.into(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn registry(&self) -> &ProbeRegistry {
        &self.registry
    }

    /// Execute one collection run
    ///
    /// `progress` and `log` are write-only side channels. `cancel` is checked
    /// between probes: the running probe finishes, the rest are skipped and
    /// the partial directory is still archived.
    pub async fn collect(
        &self,
        progress: &dyn ProgressObserver,
        log: &dyn LogSink,
        cancel: &CancelToken,
    ) -> CollectionRun {
        let run_id = self.clock.now().format(RUN_ID_FORMAT).to_string();
        let directory = self.output_root.join(format!("{REPORT_DIR_PREFIX}{run_id}"));
        let mut run = CollectionRun::new(run_id, directory.clone());

        progress.on_progress(PROGRESS_START);
        info!(run_id = %run.run_id, directory = %directory.display(), probes = self.registry.len(), "Collection started");

        if let Err(e) = self.create_run_directory(&directory).await {
            error!(run_id = %run.run_id, error = %e, "Collection setup failed");
            self.log(log, &format!("Setup failed: {e}"));
            run.fail(e);
            return run;
        }

        for probe in self.registry.all() {
            if cancel.is_cancelled() {
                if !run.cancelled {
                    warn!(run_id = %run.run_id, next_probe = %probe.name, "Collection cancelled");
                    self.log(log, "Cancelled: remaining probes skipped");
                    run.cancelled = true;
                }
                let result = self.skip_probe(probe, &directory).await;
                run.record(result);
            } else {
                self.log(log, &format!("Running: {}", probe.name));
                let result = self.run_probe(probe, &directory).await;
                self.log(log, &result_line(&result));
                run.record(result);
            }
            progress.on_progress(run.advance(probe.checkpoint));
        }

        match self.archiver.package(&directory).await {
            Ok(archive_path) => {
                info!(
                    run_id = %run.run_id,
                    archive = %archive_path.display(),
                    succeeded = run.succeeded_count(),
                    failed = run.failed_count(),
                    skipped = run.skipped_count(),
                    "Collection archived"
                );
                self.log(log, &format!("Archive created: {}", archive_path.display()));
                run.complete(archive_path);
                progress.on_progress(PROGRESS_DONE);
            }
            Err(source) => {
                error!(run_id = %run.run_id, error = %source, "Archival failed, artifacts left on disk");
                self.log(log, &format!("Archive failed: {source}"));
                run.fail(CollectionError::Archival {
                    path: directory,
                    source,
                });
            }
        }

        run
    }

    /// Fresh directory only: an existing one (same-second retrigger) is a setup fault
    async fn create_run_directory(&self, directory: &Path) -> Result<(), CollectionError> {
        let setup_fault = |e: std::io::Error| CollectionError::Setup {
            path: directory.to_path_buf(),
            reason: e.to_string(),
        };

        fs::create_dir_all(&self.output_root).await.map_err(setup_fault)?;
        fs::create_dir(directory).await.map_err(setup_fault)
    }

    async fn run_probe(&self, probe: &Probe, directory: &Path) -> ProbeResult {
        let artifact_path = directory.join(&probe.artifact_name);
        let started = Instant::now();

        let output = self.invoker.invoke(probe).await;
        let ProbeOutput {
            text,
            succeeded,
            detail,
            attempts,
        } = output;

        let mut result = match fs::write(&artifact_path, text.as_bytes()).await {
            Ok(()) if succeeded => ProbeResult::success(&probe.name, artifact_path),
            Ok(()) => ProbeResult::failure(
                &probe.name,
                artifact_path,
                detail.unwrap_or_else(|| "probe failed".to_string()),
            ),
            Err(e) => {
                warn!(probe = %probe.name, error = %e, "Could not write artifact");
                ProbeResult::failure(&probe.name, artifact_path, format!("artifact write failed: {e}"))
            }
        };
        result.attempts = attempts;
        result.duration_ms = started.elapsed().as_millis() as i64;

        if result.succeeded {
            info!(probe = %probe.name, duration_ms = result.duration_ms, "Probe succeeded");
        } else {
            warn!(
                probe = %probe.name,
                attempts = result.attempts,
                detail = result.error_detail.as_deref().unwrap_or_default(),
                "Probe failed"
            );
        }
        result
    }

    async fn skip_probe(&self, probe: &Probe, directory: &Path) -> ProbeResult {
        let artifact_path = directory.join(&probe.artifact_name);
        if let Err(e) = fs::write(&artifact_path, SKIPPED_PLACEHOLDER).await {
            warn!(probe = %probe.name, error = %e, "Could not write skip placeholder");
        }
        ProbeResult::skipped(&probe.name, artifact_path)
    }

    fn log(&self, sink: &dyn LogSink, message: &str) {
        let stamp = self.clock.now().format(LOG_LINE_TIME_FORMAT);
        sink.log_line(&format!("[{stamp}] {message}"));
    }
}

fn result_line(result: &ProbeResult) -> String {
    match (&result.error_detail, result.succeeded) {
        (_, true) => format!("{}: OK", result.probe_name),
        (Some(detail), false) => format!("{}: FAILED ({detail})", result.probe_name),
        (None, false) => format!("{}: FAILED", result.probe_name),
    }
}
