// Application constants (ADR: No magic values)
use std::time::Duration;

/// Live poller cadence (1s)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Per-probe timeout (2 minutes)
/// Event-log queries on large Security logs are the slow ones
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(120);

/// Pause between attempts of a retried probe (2s)
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Graceful process shutdown timeout (5 seconds)
/// After SIGTERM, a timed-out probe gets this long before SIGKILL
pub const GRACEFUL_SHUTDOWN_TIMEOUT_MS: i64 = 5000;

/// Report directory name prefix; the run id follows
pub const REPORT_DIR_PREFIX: &str = "HelpdeskReport_";

/// Run id format (one-second granularity)
pub const RUN_ID_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Timestamp prefix of log sink lines
pub const LOG_LINE_TIME_FORMAT: &str = "%H:%M:%S";

/// Progress checkpoint that opens every run
pub const PROGRESS_START: u8 = 0;

/// Progress checkpoint that closes a successfully archived run
pub const PROGRESS_DONE: u8 = 100;
