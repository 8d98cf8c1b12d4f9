// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Duplicate probe name: {0}")]
    DuplicateProbe(String),

    #[error("Duplicate artifact name: {0}")]
    DuplicateArtifact(String),

    #[error("Checkpoint {checkpoint} of probe {probe} is outside 0..=100")]
    CheckpointOutOfRange { probe: String, checkpoint: u8 },

    #[error("Checkpoint of probe {probe} goes backwards ({previous} -> {checkpoint})")]
    CheckpointDecreasing {
        probe: String,
        previous: u8,
        checkpoint: u8,
    },

    #[error("Invalid artifact name for probe {probe}: {artifact}")]
    InvalidArtifactName { probe: String, artifact: String },
}

pub type Result<T> = std::result::Result<T, DomainError>;
