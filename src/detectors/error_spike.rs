//! Share of 5xx responses over the whole batch.

use super::{Detector, DetectorError};
use crate::alert::{Alert, AlertDetails};
use crate::events::TrafficRecord;

pub struct ErrorSpikeDetector {
    threshold: f64,
}

impl ErrorSpikeDetector {
    pub fn new(error_rate_threshold: f64) -> Self {
        Self {
            threshold: error_rate_threshold,
        }
    }
}

impl Detector for ErrorSpikeDetector {
    fn name(&self) -> &'static str {
        "error_spike"
    }

    fn detect(&self, traffic: &[TrafficRecord]) -> Result<Vec<Alert>, DetectorError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(DetectorError::InvalidConfig(format!(
                "error rate threshold {} outside 0.0..=1.0",
                self.threshold
            )));
        }
        if traffic.is_empty() {
            return Ok(Vec::new());
        }

        let error_count = traffic.iter().filter(|r| r.is_server_error()).count();
        let error_rate = error_count as f64 / traffic.len() as f64;
        if error_rate <= self.threshold {
            return Ok(Vec::new());
        }
        Ok(vec![Alert::new(AlertDetails::ErrorSpike {
            error_count,
            error_rate,
            threshold: self.threshold,
        })])
    }
}
