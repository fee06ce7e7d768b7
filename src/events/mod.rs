//! Event records: payment messages and traffic requests, plus the normalizers
//! that turn upstream framing into typed records.

mod payment;
mod traffic;

use serde::{Deserialize, Serialize};

pub use payment::{fingerprint, mask_pan, MessageClass, PaymentFields, AUTHORIZATION_REQUEST_MTI};
pub(crate) use payment::with_stan;
pub use traffic::{read_traffic_ndjson, NdjsonBatch};

/// A payment message as retained by the capture store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Capture order within the owning store
    pub sequence: u64,
    pub timestamp: f64,
    pub raw_payload: String,
    pub mti: String,
    pub pan_masked: String,
    /// Minor units
    pub amount: u64,
    pub stan: String,
    pub fingerprint: String,
    pub replay_count: u32,
}

impl PaymentRecord {
    pub fn class(&self) -> MessageClass {
        MessageClass::from_mti(&self.mti)
    }
}

/// One observed request. Missing fields decode to `0` / empty.
///
/// `source` and `status` are accepted for `source_ip` and `status_code`; when
/// both spellings appear the canonical key wins. A status that is not an
/// integer in `0..=65535` (`"503"` is accepted, `200.5` is not) decodes to `0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "TrafficWire")]
pub struct TrafficRecord {
    pub timestamp: f64,
    pub source_ip: String,
    pub terminal_id: String,
    pub response_time_ms: f64,
    pub status_code: u16,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct TrafficWire {
    timestamp: f64,
    source_ip: Option<String>,
    source: Option<String>,
    terminal_id: String,
    response_time_ms: f64,
    status_code: Option<serde_json::Value>,
    status: Option<serde_json::Value>,
}

impl From<TrafficWire> for TrafficRecord {
    fn from(w: TrafficWire) -> Self {
        let status_code = w
            .status_code
            .as_ref()
            .and_then(status_from_json)
            .or_else(|| w.status.as_ref().and_then(status_from_json))
            .unwrap_or(0);
        Self {
            timestamp: w.timestamp,
            source_ip: w.source_ip.or(w.source).unwrap_or_default(),
            terminal_id: w.terminal_id,
            response_time_ms: w.response_time_ms,
            status_code,
        }
    }
}

fn status_from_json(v: &serde_json::Value) -> Option<u16> {
    match v {
        serde_json::Value::Number(n) => match n.as_u64() {
            Some(u) => u16::try_from(u).ok(),
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && (0.0..=f64::from(u16::MAX)).contains(f))
                .map(|f| f as u16),
        },
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl TrafficRecord {
    pub fn new(
        timestamp: f64,
        source_ip: impl Into<String>,
        terminal_id: impl Into<String>,
        response_time_ms: f64,
        status_code: u16,
    ) -> Self {
        Self {
            timestamp,
            source_ip: source_ip.into(),
            terminal_id: terminal_id.into(),
            response_time_ms,
            status_code,
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code >= 500
    }
}

/// Unified record handed out by the monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventRecord {
    Payment(PaymentRecord),
    Traffic(TrafficRecord),
}

impl EventRecord {
    pub fn timestamp(&self) -> f64 {
        match self {
            EventRecord::Payment(p) => p.timestamp,
            EventRecord::Traffic(t) => t.timestamp,
        }
    }
}
