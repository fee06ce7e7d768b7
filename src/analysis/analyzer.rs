//! Batch analyzer: traffic records → detectors → merged report.
//!
//! Detectors are isolated from one another. One that errors or panics is
//! listed as degraded in the report and the rest still run.

use super::{AnalysisReport, DegradedDetector};
use crate::config::DetectorsConfig;
use crate::detectors::{standard_detectors, Detector};
use crate::events::TrafficRecord;
use std::any::Any;
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{info, warn};

pub struct TrafficAnalyzer {
    detectors: Vec<Box<dyn Detector>>,
    requests: Vec<TrafficRecord>,
}

impl TrafficAnalyzer {
    pub fn new(config: &DetectorsConfig) -> Self {
        Self::with_detectors(standard_detectors(config))
    }

    pub fn with_detectors(detectors: Vec<Box<dyn Detector>>) -> Self {
        Self {
            detectors,
            requests: Vec::new(),
        }
    }

    pub fn add_request(&mut self, request: TrafficRecord) {
        self.requests.push(request);
    }

    pub fn extend(&mut self, requests: impl IntoIterator<Item = TrafficRecord>) {
        self.requests.extend(requests);
    }

    pub fn records(&self) -> &[TrafficRecord] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Drop records with `timestamp < cutoff`; returns how many were removed.
    /// Needed before each run when analyzing a growing stream.
    pub fn retain_since(&mut self, cutoff: f64) -> usize {
        let before = self.requests.len();
        self.requests.retain(|r| r.timestamp >= cutoff);
        before - self.requests.len()
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }

    pub fn analyze(&self) -> AnalysisReport {
        run_detectors(&self.detectors, &self.requests)
    }
}

/// One-shot analysis of a closed batch with the standard detector set.
pub fn analyze_traffic(config: &DetectorsConfig, traffic: &[TrafficRecord]) -> AnalysisReport {
    run_detectors(&standard_detectors(config), traffic)
}

fn run_detectors(detectors: &[Box<dyn Detector>], traffic: &[TrafficRecord]) -> AnalysisReport {
    let mut alerts = Vec::new();
    let mut degraded = Vec::new();

    for detector in detectors {
        let outcome = catch_unwind(AssertUnwindSafe(|| detector.detect(traffic)));
        let reason = match outcome {
            Ok(Ok(found)) => {
                alerts.extend(found);
                continue;
            }
            Ok(Err(e)) => e.to_string(),
            Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
        };
        warn!(detector = detector.name(), %reason, "detector degraded");
        degraded.push(DegradedDetector {
            detector: detector.name().to_string(),
            reason,
        });
    }

    let unique_sources = traffic
        .iter()
        .map(|r| r.source_ip.as_str())
        .collect::<HashSet<_>>()
        .len();
    let unique_terminals = traffic
        .iter()
        .map(|r| r.terminal_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    let report = AnalysisReport::new(
        traffic.len(),
        unique_sources,
        unique_terminals,
        alerts,
        degraded,
    );
    info!(
        report_id = %report.report_id,
        status = ?report.status,
        requests = report.total_requests,
        critical = report.summary.critical,
        high = report.summary.high,
        degraded = report.degraded.len(),
        "traffic analyzed"
    );
    report
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
