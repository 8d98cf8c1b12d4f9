// Helpdesk Infrastructure - System Adapters
// Implements: CommandRunner, TelemetrySource, HostIdentity, Archiver

pub mod host_identity;
pub mod shell_runner;
pub mod sysinfo_telemetry;
pub mod tar_archiver;

pub use host_identity::SystemHostIdentity;
pub use shell_runner::ShellCommandRunner;
pub use sysinfo_telemetry::SysinfoTelemetry;
pub use tar_archiver::{TarGzArchiver, ARCHIVE_EXTENSION};
