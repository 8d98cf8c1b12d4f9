// Time Provider Port (for testability)

use chrono::{DateTime, Local};

/// Time provider interface (allows mocking in tests)
pub trait TimeProvider: Send + Sync {
    /// Current local wall-clock time
    fn now(&self) -> DateTime<Local>;
}

/// System time provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::sync::Mutex;

    /// Clock that moves forward by a fixed step on every read
    pub struct SteppingClock {
        current: Mutex<DateTime<Local>>,
        step: Duration,
    }

    impl SteppingClock {
        pub fn new(start: DateTime<Local>, step: Duration) -> Self {
            Self {
                current: Mutex::new(start),
                step,
            }
        }

        /// 2026-03-14 09:30:00 local, one second per read
        pub fn default_start() -> Self {
            let start = Local
                .with_ymd_and_hms(2026, 3, 14, 9, 30, 0)
                .single()
                .unwrap_or_else(Local::now);
            Self::new(start, Duration::seconds(1))
        }

        /// Frozen clock: every read returns the same instant
        pub fn frozen(at: DateTime<Local>) -> Self {
            Self::new(at, Duration::zero())
        }
    }

    impl TimeProvider for SteppingClock {
        fn now(&self) -> DateTime<Local> {
            let mut current = self.current.lock().unwrap();
            let now = *current;
            *current = now + self.step;
            now
        }
    }
}
