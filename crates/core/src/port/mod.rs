// Port Layer - Interfaces for external dependencies

pub mod archiver;
pub mod command_runner;
pub mod observer;
pub mod telemetry;
pub mod time_provider; // For deterministic run ids in tests

// Re-exports
pub use archiver::{ArchiveError, Archiver};
pub use command_runner::{CommandOutput, CommandRunner, RunnerError};
pub use observer::{LogSink, NullSink, ProgressObserver, SampleSink};
pub use telemetry::{
    HostIdentity, MemoryStats, PlatformInfo, SampleFault, StorageDevice, TelemetrySource,
};
pub use time_provider::{SystemTimeProvider, TimeProvider};
