// Domain Layer - Pure business logic and entities

pub mod error;
pub mod health;
pub mod probe;
pub mod run;
pub mod sample;

// Re-exports
pub use error::DomainError;
pub use health::MemoryHealth;
pub use probe::{DerivedMetric, Probe, ProbeKind, ShellCommand};
pub use run::{CollectionRun, ProbeResult, RunId, RunOutcome};
pub use sample::{MetricsSample, Reading};
