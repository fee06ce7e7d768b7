//! JSON log lines: one JSON object per line (ndjson) for ingestion and audit.

use crate::alert::{AlertType, Severity, Status};
use crate::analysis::AnalysisReport;
use crate::config::LogConfig;
use serde::Serialize;
use std::io::Write;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Flat audit line for one alert, tagged with the report it belongs to.
#[derive(Debug, Serialize)]
pub struct AlertLogLine<'a> {
    pub ts: String,
    pub report_id: &'a str,
    pub status: Status,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'a str>,
}

pub struct StructuredLogger;

impl StructuredLogger {
    /// Install global subscriber: JSON or plain lines to stdout, level from
    /// RUST_LOG or `default_level`. Returns false if a subscriber was already set.
    pub fn init(json: bool, default_level: &str) -> bool {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        if json {
            let fmt = tracing_subscriber::fmt::layer()
                .json()
                .with_span_events(FmtSpan::NONE)
                .with_writer(std::io::stdout);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt)
                .try_init()
                .is_ok()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
                .try_init()
                .is_ok()
        }
    }

    pub fn init_from_config(config: &LogConfig) -> bool {
        Self::init(config.json, &config.level)
    }

    /// Emit a single structured line without going through tracing
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) -> std::io::Result<()> {
        let line = serde_json::to_string(event)?;
        writeln!(w, "{}", line)
    }

    /// One audit line per alert in the report; nothing for a clean report.
    pub fn emit_alerts(report: &AnalysisReport, w: &mut impl Write) -> std::io::Result<usize> {
        let ts = report.generated_at.to_rfc3339();
        for alert in &report.alerts {
            let source = match &alert.details {
                crate::alert::AlertDetails::RateLimitExceeded { source, .. } => {
                    Some(source.as_str())
                }
                _ => None,
            };
            let line = AlertLogLine {
                ts: ts.clone(),
                report_id: &report.report_id,
                status: report.status,
                alert_type: alert.alert_type(),
                severity: alert.severity(),
                source,
            };
            Self::emit_json(&line, w)?;
        }
        Ok(report.alerts.len())
    }
}
