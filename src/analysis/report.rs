use crate::alert::{Alert, SeveritySummary, Status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A detector that failed during a run and contributed no alerts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradedDetector {
    pub detector: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub report_id: String,
    pub generated_at: DateTime<Utc>,
    pub status: Status,
    pub total_requests: usize,
    pub unique_sources: usize,
    pub unique_terminals: usize,
    pub alerts: Vec<Alert>,
    pub summary: SeveritySummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<DegradedDetector>,
}

impl AnalysisReport {
    pub(crate) fn new(
        total_requests: usize,
        unique_sources: usize,
        unique_terminals: usize,
        alerts: Vec<Alert>,
        degraded: Vec<DegradedDetector>,
    ) -> Self {
        Self {
            report_id: Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            status: Status::from_alerts(&alerts),
            total_requests,
            unique_sources,
            unique_terminals,
            summary: SeveritySummary::from_alerts(&alerts),
            alerts,
            degraded,
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}
