//! Per-source request rate, bucketed by whole second.

use super::{finite_timestamps, Detector, DetectorError};
use crate::alert::{Alert, AlertDetails};
use crate::events::TrafficRecord;
use std::collections::{BTreeMap, HashMap};

pub struct RateLimitDetector {
    limit: u64,
}

impl RateLimitDetector {
    pub fn new(limit_per_source: u64) -> Self {
        Self {
            limit: limit_per_source,
        }
    }
}

impl Detector for RateLimitDetector {
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    /// One alert per (source, second) whose count exceeds the limit. Sources
    /// in first-seen order, seconds ascending.
    fn detect(&self, traffic: &[TrafficRecord]) -> Result<Vec<Alert>, DetectorError> {
        finite_timestamps(traffic)?;

        let mut order: Vec<&str> = Vec::new();
        let mut by_source: HashMap<&str, BTreeMap<i64, u64>> = HashMap::new();
        for r in traffic {
            let buckets = by_source.entry(r.source_ip.as_str()).or_insert_with(|| {
                order.push(r.source_ip.as_str());
                BTreeMap::new()
            });
            *buckets.entry(r.timestamp.trunc() as i64).or_insert(0) += 1;
        }

        let mut alerts = Vec::new();
        for source in order {
            for (&second, &count) in &by_source[source] {
                if count > self.limit {
                    alerts.push(Alert::new(AlertDetails::RateLimitExceeded {
                        source: source.to_string(),
                        rate: count,
                        limit: self.limit,
                        timestamp: second,
                    }));
                }
            }
        }
        Ok(alerts)
    }
}
