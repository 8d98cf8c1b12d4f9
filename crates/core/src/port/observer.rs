// Side-channel observer ports
// Write-only from the producer's side; the presentation layer implements them.

use crate::domain::MetricsSample;

/// Receives progress checkpoints (0-100) during a collection run
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, checkpoint: u8);
}

/// Receives timestamped human-readable lines during a collection run
pub trait LogSink: Send + Sync {
    fn log_line(&self, line: &str);
}

/// Live metrics display surface
pub trait SampleSink: Send + Sync {
    fn publish(&self, sample: &MetricsSample);
}

/// Discards everything (headless runs)
pub struct NullSink;

impl ProgressObserver for NullSink {
    fn on_progress(&self, _checkpoint: u8) {}
}

impl LogSink for NullSink {
    fn log_line(&self, _line: &str) {}
}

impl SampleSink for NullSink {
    fn publish(&self, _sample: &MetricsSample) {}
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Records every callback
    #[derive(Default)]
    pub struct RecordingObserver {
        progress: Mutex<Vec<u8>>,
        lines: Mutex<Vec<String>>,
        samples: Mutex<Vec<MetricsSample>>,
    }

    impl RecordingObserver {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn progress(&self) -> Vec<u8> {
            self.progress.lock().unwrap().clone()
        }

        pub fn lines(&self) -> Vec<String> {
            self.lines.lock().unwrap().clone()
        }

        pub fn samples(&self) -> Vec<MetricsSample> {
            self.samples.lock().unwrap().clone()
        }
    }

    impl ProgressObserver for RecordingObserver {
        fn on_progress(&self, checkpoint: u8) {
            self.progress.lock().unwrap().push(checkpoint);
        }
    }

    impl LogSink for RecordingObserver {
        fn log_line(&self, line: &str) {
            self.lines.lock().unwrap().push(line.to_string());
        }
    }

    impl SampleSink for RecordingObserver {
        fn publish(&self, sample: &MetricsSample) {
            self.samples.lock().unwrap().push(sample.clone());
        }
    }
}
