// Memory Health Classification

use serde::{Deserialize, Serialize};

/// Usage at or above this is WARNING (percent)
pub const MEMORY_WARNING_PERCENT: f64 = 85.0;

/// Usage at or above this is CRITICAL (percent)
pub const MEMORY_CRITICAL_PERCENT: f64 = 95.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemoryHealth {
    Ok,
    Warning,
    Critical,
}

impl MemoryHealth {
    /// Classify a memory usage percentage. Thresholds are fixed and
    /// inclusive on the upper side.
    pub fn classify(used_percent: f64) -> Self {
        if used_percent >= MEMORY_CRITICAL_PERCENT {
            Self::Critical
        } else if used_percent >= MEMORY_WARNING_PERCENT {
            Self::Warning
        } else {
            Self::Ok
        }
    }
}

impl std::fmt::Display for MemoryHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryHealth::Ok => write!(f, "OK"),
            MemoryHealth::Warning => write!(f, "WARNING"),
            MemoryHealth::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_boundaries() {
        assert_eq!(MemoryHealth::classify(84.9), MemoryHealth::Ok);
        assert_eq!(MemoryHealth::classify(85.0), MemoryHealth::Warning);
        assert_eq!(MemoryHealth::classify(94.9), MemoryHealth::Warning);
        assert_eq!(MemoryHealth::classify(95.0), MemoryHealth::Critical);
    }

    #[test]
    fn test_classification_extremes() {
        assert_eq!(MemoryHealth::classify(0.0), MemoryHealth::Ok);
        assert_eq!(MemoryHealth::classify(100.0), MemoryHealth::Critical);
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(MemoryHealth::Ok.to_string(), "OK");
        assert_eq!(MemoryHealth::Warning.to_string(), "WARNING");
        assert_eq!(MemoryHealth::Critical.to_string(), "CRITICAL");
    }
}
