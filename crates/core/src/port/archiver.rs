// Archiver Port
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Archival errors (run-fatal)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    #[error("directory unreadable: {0}")]
    DirectoryUnreadable(String),

    #[error("destination unwritable: {0}")]
    DestinationUnwritable(String),

    #[error("archive already exists: {0}")]
    AlreadyExists(String),
}

/// Packages a run's output directory into one compressed file
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Where `package` will put the archive for `directory`
    ///
    /// Deterministic from the directory name; sibling of the directory.
    fn archive_path_for(&self, directory: &Path) -> PathBuf;

    /// Package every file under `directory`
    ///
    /// # Errors
    /// - ArchiveError::DirectoryUnreadable if the directory cannot be walked
    /// - ArchiveError::DestinationUnwritable if the archive cannot be written
    /// - ArchiveError::AlreadyExists if an archive is already at the target path
    async fn package(&self, directory: &Path) -> Result<PathBuf, ArchiveError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock Archiver: never touches the disk
    pub struct MockArchiver {
        failure: Option<ArchiveError>,
        packaged: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl MockArchiver {
        pub fn new_success() -> Self {
            Self {
                failure: None,
                packaged: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_fail(error: ArchiveError) -> Self {
            Self {
                failure: Some(error),
                packaged: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn packaged(&self) -> Vec<PathBuf> {
            self.packaged.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Archiver for MockArchiver {
        fn archive_path_for(&self, directory: &Path) -> PathBuf {
            directory.with_extension("mock.archive")
        }

        async fn package(&self, directory: &Path) -> Result<PathBuf, ArchiveError> {
            if let Some(err) = &self.failure {
                return Err(err.clone());
            }
            self.packaged.lock().unwrap().push(directory.to_path_buf());
            Ok(self.archive_path_for(directory))
        }
    }
}
