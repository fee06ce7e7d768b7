//! Share of slow requests.

use super::{Detector, DetectorError};
use crate::alert::{Alert, AlertDetails};
use crate::events::TrafficRecord;

/// More than this fraction of slow requests raises an alert.
pub const SLOW_REQUEST_RATIO: f64 = 0.1;

pub struct LatencyDetector {
    threshold_ms: f64,
}

impl LatencyDetector {
    pub fn new(threshold_ms: f64) -> Self {
        Self { threshold_ms }
    }
}

impl Detector for LatencyDetector {
    fn name(&self) -> &'static str {
        "latency"
    }

    fn detect(&self, traffic: &[TrafficRecord]) -> Result<Vec<Alert>, DetectorError> {
        if self.threshold_ms.is_nan() {
            return Err(DetectorError::InvalidConfig(
                "latency threshold is NaN".to_string(),
            ));
        }
        let slow: Vec<f64> = traffic
            .iter()
            .map(|r| r.response_time_ms)
            .filter(|&ms| ms > self.threshold_ms)
            .collect();
        if slow.is_empty() {
            return Ok(Vec::new());
        }

        let rate = slow.len() as f64 / traffic.len() as f64;
        if rate <= SLOW_REQUEST_RATIO {
            return Ok(Vec::new());
        }
        Ok(vec![Alert::new(AlertDetails::HighLatency {
            affected_requests: slow.len(),
            total_requests: traffic.len(),
            rate,
            avg_latency: slow.iter().sum::<f64>() / slow.len() as f64,
        })])
    }
}
