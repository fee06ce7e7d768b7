//! Monitor facade: routes payment messages to the capture store and traffic
//! requests to the analyzer, and tracks incident state across analysis runs.

use crate::alert::Status;
use crate::analysis::{AnalysisReport, TrafficAnalyzer};
use crate::capture::CaptureStore;
use crate::clock::{Clock, SystemClock};
use crate::config::MonitorConfig;
use crate::events::{EventRecord, TrafficRecord};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Something observed upstream, before normalization into an [`EventRecord`].
#[derive(Debug, Clone)]
pub enum Inbound {
    /// Raw pipe-delimited payment message
    Payment(String),
    Traffic(TrafficRecord),
}

/// Incident state owned by one monitor instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncidentState {
    pub status: Status,
    /// When the current non-normal status was first reported
    pub since: Option<f64>,
    pub analyses: u64,
}

impl Default for IncidentState {
    fn default() -> Self {
        Self {
            status: Status::Normal,
            since: None,
            analyses: 0,
        }
    }
}

pub struct Monitor {
    config: MonitorConfig,
    clock: Arc<dyn Clock>,
    store: CaptureStore,
    analyzer: Mutex<TrafficAnalyzer>,
    incident: Mutex<IncidentState>,
}

fn relock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Monitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: MonitorConfig, clock: Arc<dyn Clock>) -> Self {
        let store = CaptureStore::with_clock(&config.capture, clock.clone());
        let analyzer = TrafficAnalyzer::new(&config.detectors);
        Self {
            config,
            clock,
            store,
            analyzer: Mutex::new(analyzer),
            incident: Mutex::new(IncidentState::default()),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn capture_store(&self) -> &CaptureStore {
        &self.store
    }

    pub fn ingest(&self, inbound: Inbound) -> EventRecord {
        match inbound {
            Inbound::Payment(raw) => EventRecord::Payment(self.store.capture(&raw)),
            Inbound::Traffic(record) => {
                relock(&self.analyzer).add_request(record.clone());
                EventRecord::Traffic(record)
            }
        }
    }

    pub fn traffic_len(&self) -> usize {
        relock(&self.analyzer).len()
    }

    /// Drop traffic older than the configured analysis window.
    pub fn prune_traffic(&self) -> usize {
        let cutoff = self.clock.now() - self.config.detectors.analysis_window_seconds;
        let removed = relock(&self.analyzer).retain_since(cutoff);
        if removed > 0 {
            debug!(removed, cutoff, "pruned traffic outside analysis window");
        }
        removed
    }

    pub fn analyze(&self) -> AnalysisReport {
        let report = relock(&self.analyzer).analyze();

        let mut incident = relock(&self.incident);
        incident.analyses += 1;
        match (incident.status, report.status) {
            (prev, Status::Normal) if prev != Status::Normal => {
                info!("incident cleared");
                incident.since = None;
            }
            (Status::Normal, now) if now != Status::Normal => {
                info!(status = ?now, "incident opened");
                incident.since = Some(self.clock.now());
            }
            _ => {}
        }
        incident.status = report.status;
        report
    }

    pub fn incident(&self) -> IncidentState {
        *relock(&self.incident)
    }
}
