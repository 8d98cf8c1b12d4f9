// Live Metrics Sample

use chrono::{DateTime, Local};
use serde::Serialize;
use std::net::IpAddr;

use crate::port::SampleFault;

/// A best-effort value: either measured, or explicitly unavailable with a reason.
///
/// Never substitute zero for a missing reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Reading<T> {
    Available(T),
    Unavailable(String),
}

impl<T> Reading<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Reading::Unavailable(reason.into())
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Reading::Available(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Reading::Available(v) => Some(v),
            Reading::Unavailable(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reading<U> {
        match self {
            Reading::Available(v) => Reading::Available(f(v)),
            Reading::Unavailable(reason) => Reading::Unavailable(reason),
        }
    }
}

impl<T> From<Result<T, SampleFault>> for Reading<T> {
    fn from(result: Result<T, SampleFault>) -> Self {
        match result {
            Ok(v) => Reading::Available(v),
            Err(fault) => Reading::Unavailable(fault.to_string()),
        }
    }
}

/// One poll tick's worth of host vitals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSample {
    pub sampled_at: DateTime<Local>,
    pub cpu_percent: Reading<f32>,
    pub mem_percent: Reading<f32>,
    pub disk_percent: Reading<f32>,
    pub temperature_celsius: Reading<f32>,
    pub hostname: Reading<String>,
    pub ip_address: Reading<IpAddr>,
}

impl MetricsSample {
    /// Number of fields that could not be measured this tick
    pub fn unavailable_fields(&self) -> usize {
        [
            self.cpu_percent.is_available(),
            self.mem_percent.is_available(),
            self.disk_percent.is_available(),
            self.temperature_celsius.is_available(),
            self.hostname.is_available(),
            self.ip_address.is_available(),
        ]
        .iter()
        .filter(|ok| !**ok)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_distinct_from_unavailable() {
        let zero: Reading<f32> = Ok(0.0).into();
        let missing: Reading<f32> = Err(SampleFault::SourceUnavailable).into();

        assert_eq!(zero.value(), Some(&0.0));
        assert!(missing.value().is_none());
        assert_ne!(zero, missing);
    }

    #[test]
    fn test_serialized_marker() {
        let missing: Reading<f32> = Reading::unavailable("no sensor");
        let json = serde_json::to_value(&missing).unwrap();

        assert_eq!(json["status"], "unavailable");
        assert_eq!(json["value"], "no sensor");
    }

    #[test]
    fn test_map_preserves_reason() {
        let missing: Reading<u64> = Reading::unavailable("gone");
        assert_eq!(missing.map(|v| v * 2), Reading::Unavailable("gone".to_string()));
        assert_eq!(Reading::Available(2u64).map(|v| v * 2), Reading::Available(4));
    }
}
