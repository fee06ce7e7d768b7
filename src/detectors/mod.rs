//! Traffic anomaly detectors. Each is a pure function of a closed batch of
//! traffic records; none of them see each other's output.

mod burst;
mod error_spike;
mod latency;
mod rate;

pub use burst::BurstDetector;
pub use error_spike::ErrorSpikeDetector;
pub use latency::LatencyDetector;
pub use rate::RateLimitDetector;

use crate::alert::Alert;
use crate::config::DetectorsConfig;
use crate::events::TrafficRecord;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectorError {
    #[error("record {index} has non-finite timestamp {value}")]
    InvalidTimestamp { index: usize, value: f64 },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub trait Detector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Alerts for the whole batch. No qualifying input means an empty vec, not an error.
    fn detect(&self, traffic: &[TrafficRecord]) -> Result<Vec<Alert>, DetectorError>;
}

/// The four standard detectors in report order: rate, burst, latency, errors.
pub fn standard_detectors(config: &DetectorsConfig) -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(RateLimitDetector::new(config.rate_limit_per_source)),
        Box::new(BurstDetector::new(
            config.burst_window_seconds,
            config.burst_threshold,
        )),
        Box::new(LatencyDetector::new(config.latency_threshold_ms)),
        Box::new(ErrorSpikeDetector::new(config.error_rate_threshold)),
    ]
}

fn finite_timestamps(traffic: &[TrafficRecord]) -> Result<(), DetectorError> {
    match traffic.iter().position(|r| !r.timestamp.is_finite()) {
        Some(index) => Err(DetectorError::InvalidTimestamp {
            index,
            value: traffic[index].timestamp,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
pub(crate) fn at(ts: f64, source: &str) -> TrafficRecord {
    TrafficRecord::new(ts, source, "T0001", 50.0, 200)
}
