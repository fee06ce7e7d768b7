//! Volume burst across all sources inside a sliding time window.
//!
//! Only the earliest qualifying window is reported; scanning stops there even
//! when a later window would be larger.

use super::{finite_timestamps, Detector, DetectorError};
use crate::alert::{Alert, AlertDetails};
use crate::events::TrafficRecord;

pub struct BurstDetector {
    window_seconds: f64,
    threshold: usize,
}

impl BurstDetector {
    pub fn new(window_seconds: f64, threshold: usize) -> Self {
        Self {
            window_seconds,
            threshold,
        }
    }
}

impl Detector for BurstDetector {
    fn name(&self) -> &'static str {
        "burst"
    }

    fn detect(&self, traffic: &[TrafficRecord]) -> Result<Vec<Alert>, DetectorError> {
        if !self.window_seconds.is_finite() || self.window_seconds < 0.0 {
            return Err(DetectorError::InvalidConfig(format!(
                "burst window {} must be a non-negative number of seconds",
                self.window_seconds
            )));
        }
        if traffic.len() < self.threshold {
            return Ok(Vec::new());
        }
        finite_timestamps(traffic)?;

        let mut ts: Vec<f64> = traffic.iter().map(|r| r.timestamp).collect();
        ts.sort_by(f64::total_cmp);

        // events[i..end] all lie within window_seconds of ts[i]; end never moves back
        let mut end = 0;
        for i in 0..ts.len() {
            end = end.max(i);
            while end < ts.len() && ts[end] - ts[i] <= self.window_seconds {
                end += 1;
            }
            let count = end - i;
            if count >= self.threshold {
                return Ok(vec![Alert::new(AlertDetails::BurstDetected {
                    count,
                    window_seconds: self.window_seconds,
                    start_time: ts[i],
                })]);
            }
        }
        Ok(Vec::new())
    }
}
