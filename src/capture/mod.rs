//! In-memory replay capture store with content-fingerprint deduplication.

mod store;

pub use store::{CaptureStatistics, CaptureStore, ReplayError, ReplayOutcome};
