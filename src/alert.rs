//! Alerts raised by the traffic detectors and the overall status derived from them.

use serde::{Deserialize, Serialize};

/// Ordered by urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    High,
    Critical,
}

/// Overall classification of an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Normal,
    Suspicious,
    AttackDetected,
}

impl Status {
    /// Any critical alert is an attack; otherwise any high alert is suspicious.
    pub fn from_alerts(alerts: &[Alert]) -> Self {
        match alerts.iter().map(Alert::severity).max() {
            Some(Severity::Critical) => Status::AttackDetected,
            Some(Severity::High) => Status::Suspicious,
            None => Status::Normal,
        }
    }
}

/// One detector finding, serialized as `{"severity": ..., "type": ..., "fields": {...}}`.
/// Severity is always derived from `details`; an incoming `severity` key is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "AlertWire", from = "AlertWire")]
pub struct Alert {
    pub details: AlertDetails,
}

#[derive(Serialize, Deserialize)]
struct AlertWire {
    #[serde(default)]
    severity: Option<Severity>,
    #[serde(flatten)]
    details: AlertDetails,
}

impl From<Alert> for AlertWire {
    fn from(alert: Alert) -> Self {
        Self {
            severity: Some(alert.severity()),
            details: alert.details,
        }
    }
}

impl From<AlertWire> for Alert {
    fn from(wire: AlertWire) -> Self {
        Alert::new(wire.details)
    }
}

/// Detector-specific diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "fields", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertDetails {
    RateLimitExceeded {
        source: String,
        /// Requests seen in that second
        rate: u64,
        limit: u64,
        /// Truncated second
        timestamp: i64,
    },
    BurstDetected {
        count: usize,
        window_seconds: f64,
        start_time: f64,
    },
    HighLatency {
        affected_requests: usize,
        total_requests: usize,
        /// Fraction of slow requests (0.0–1.0)
        rate: f64,
        /// Mean response time of the slow requests only
        avg_latency: f64,
    },
    ErrorSpike {
        error_count: usize,
        error_rate: f64,
        threshold: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    RateLimitExceeded,
    BurstDetected,
    HighLatency,
    ErrorSpike,
}

impl AlertDetails {
    pub fn alert_type(&self) -> AlertType {
        match self {
            AlertDetails::RateLimitExceeded { .. } => AlertType::RateLimitExceeded,
            AlertDetails::BurstDetected { .. } => AlertType::BurstDetected,
            AlertDetails::HighLatency { .. } => AlertType::HighLatency,
            AlertDetails::ErrorSpike { .. } => AlertType::ErrorSpike,
        }
    }

    /// Fixed per alert type.
    pub fn severity(&self) -> Severity {
        match self.alert_type() {
            AlertType::RateLimitExceeded | AlertType::HighLatency => Severity::High,
            AlertType::BurstDetected | AlertType::ErrorSpike => Severity::Critical,
        }
    }
}

impl Alert {
    pub fn new(details: AlertDetails) -> Self {
        Self { details }
    }

    pub fn alert_type(&self) -> AlertType {
        self.details.alert_type()
    }

    pub fn severity(&self) -> Severity {
        self.details.severity()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeveritySummary {
    pub critical: usize,
    pub high: usize,
    pub total: usize,
}

impl SeveritySummary {
    pub fn from_alerts(alerts: &[Alert]) -> Self {
        let critical = alerts
            .iter()
            .filter(|a| a.severity() == Severity::Critical)
            .count();
        Self {
            critical,
            high: alerts.len() - critical,
            total: alerts.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn high() -> Alert {
        Alert::new(AlertDetails::HighLatency {
            affected_requests: 20,
            total_requests: 100,
            rate: 0.2,
            avg_latency: 1500.0,
        })
    }

    fn critical() -> Alert {
        Alert::new(AlertDetails::ErrorSpike {
            error_count: 40,
            error_rate: 0.4,
            threshold: 0.3,
        })
    }

    #[test]
    fn status_from_severity_multiset() {
        assert_eq!(Status::from_alerts(&[]), Status::Normal);
        assert_eq!(Status::from_alerts(&[high(), high()]), Status::Suspicious);
        assert_eq!(Status::from_alerts(&[high(), critical()]), Status::AttackDetected);
    }

    #[test]
    fn summary_counts() {
        let s = SeveritySummary::from_alerts(&[high(), critical(), critical()]);
        assert_eq!(s, SeveritySummary { critical: 2, high: 1, total: 3 });
    }

    #[test]
    fn alert_wire_shape() {
        let v = serde_json::to_value(critical()).unwrap();
        assert_eq!(v["type"], "ERROR_SPIKE");
        assert_eq!(v["severity"], "CRITICAL");
        assert_eq!(v["fields"]["error_count"], 40);
        assert_eq!(serde_json::to_value(Status::AttackDetected).unwrap(), "ATTACK_DETECTED");
    }

    #[test]
    fn severity_follows_details() {
        let mut a = critical();
        assert_eq!(a.severity(), Severity::Critical);
        a.details = high().details;
        assert_eq!(a.severity(), Severity::High);

        // a mismatched severity on the wire is re-derived
        let v = serde_json::json!({
            "severity": "HIGH",
            "type": "BURST_DETECTED",
            "fields": {"count": 600, "window_seconds": 5.0, "start_time": 1.0},
        });
        let a: Alert = serde_json::from_value(v).unwrap();
        assert_eq!(a.severity(), Severity::Critical);
        assert_eq!(Status::from_alerts(&[a]), Status::AttackDetected);
    }
}
