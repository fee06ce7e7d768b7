//! txsentry — transaction-stream security monitor.
//!
//! Modular structure:
//! - [`events`] — Payment and traffic event records, payload/NDJSON normalizers
//! - [`capture`] — Replay capture store with fingerprint deduplication
//! - [`detectors`] — Rate, burst, latency and error-spike detectors
//! - [`alert`] — Alerts, severities, overall status
//! - [`analysis`] — Aggregator producing analysis reports
//! - [`monitor`] — Facade owning a store, an analyzer and incident state
//! - [`logging`] — Structured JSON logging

pub mod alert;
pub mod analysis;
pub mod capture;
pub mod clock;
pub mod config;
pub mod detectors;
pub mod events;
pub mod logging;
pub mod monitor;

pub use alert::{Alert, AlertDetails, AlertType, Severity, Status};
pub use analysis::{analyze_traffic, AnalysisReport, TrafficAnalyzer};
pub use capture::{CaptureStore, ReplayError};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::MonitorConfig;
pub use events::{EventRecord, PaymentRecord, TrafficRecord};
pub use logging::StructuredLogger;
pub use monitor::{Inbound, Monitor};
