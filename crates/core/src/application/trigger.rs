// Collection Trigger - at most one active run per process

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::cancel::CancelToken;
use super::orchestrator::CollectionOrchestrator;
use crate::domain::CollectionRun;
use crate::error::{AppError, Result};
use crate::port::{LogSink, ProgressObserver};

/// Zero-argument entry point for starting a collection
///
/// A trigger while another run is active is rejected with `AppError::Busy`
/// before anything touches the filesystem.
pub struct CollectionTrigger {
    orchestrator: Arc<CollectionOrchestrator>,
    active: Mutex<()>,
}

impl CollectionTrigger {
    pub fn new(orchestrator: Arc<CollectionOrchestrator>) -> Self {
        Self {
            orchestrator,
            active: Mutex::new(()),
        }
    }

    /// True while a run holds the guard
    pub fn is_running(&self) -> bool {
        self.active.try_lock().is_err()
    }

    pub async fn trigger(
        &self,
        progress: &dyn ProgressObserver,
        log: &dyn LogSink,
        cancel: &CancelToken,
    ) -> Result<CollectionRun> {
        let _guard = self.active.try_lock().map_err(|_| {
            warn!("Collection already running, trigger rejected");
            AppError::Busy("a collection run is already in progress".to_string())
        })?;

        info!("Collection triggered");
        Ok(self.orchestrator.collect(progress, log, cancel).await)
    }
}
