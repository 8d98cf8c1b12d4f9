// Central Error Type for the Application

use std::path::PathBuf;
use thiserror::Error;

use crate::port::ArchiveError;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Busy: {0}")]
    Busy(String),

    #[error("Collection error: {0}")]
    Collection(#[from] CollectionError),

    #[error("Execution error: {0}")]
    Execution(#[from] crate::port::RunnerError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Run-fatal collection failures.
///
/// Everything else that goes wrong during a run is recorded per probe and
/// never surfaces as an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    #[error("could not create output directory {path}: {reason}")]
    Setup { path: PathBuf, reason: String },

    #[error("could not package {path}: {source}")]
    Archival {
        path: PathBuf,
        #[source]
        source: ArchiveError,
    },
}

impl CollectionError {
    /// Name of the failed stage, for the single user-facing notification
    pub fn stage(&self) -> &'static str {
        match self {
            CollectionError::Setup { .. } => "setup",
            CollectionError::Archival { .. } => "archival",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        let setup = CollectionError::Setup {
            path: PathBuf::from("/nope"),
            reason: "permission denied".to_string(),
        };
        let archival = CollectionError::Archival {
            path: PathBuf::from("/nope"),
            source: ArchiveError::DestinationUnwritable("read-only".to_string()),
        };

        assert_eq!(setup.stage(), "setup");
        assert_eq!(archival.stage(), "archival");
        assert!(setup.to_string().contains("permission denied"));
    }
}
