//! Captured payment messages kept for a bounded retention window. Replay dedup
//! is keyed on the original payload fingerprint, not on the STAN, so rewriting
//! the trace number does not make a message fresh again.

use crate::clock::{Clock, SystemClock};
use crate::config::CaptureConfig;
use crate::events::{fingerprint, mask_pan, with_stan, MessageClass, PaymentFields, PaymentRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

const STAN_MODULUS: u64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("message {fingerprint} already replayed")]
    AlreadyReplayed { fingerprint: String },
    #[error("record {sequence} was not captured by this store")]
    UnknownRecord { sequence: u64 },
}

/// Result of a successful replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayOutcome {
    /// Payload to re-emit (STAN possibly rewritten)
    pub payload: String,
    /// Fingerprint of the original message, now in the replayed set
    pub original_fingerprint: String,
    /// Replay count of the stored record after this replay
    pub replay_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureStatistics {
    pub total_captured: usize,
    pub total_replayed: usize,
    pub amount_captured_sum: u64,
    pub amount_replayed_sum: u64,
    pub retention_seconds: f64,
}

#[derive(Default)]
struct CaptureState {
    records: Vec<PaymentRecord>,
    replayed: HashSet<String>,
    next_sequence: u64,
}

impl CaptureState {
    fn position(&self, sequence: u64) -> Option<usize> {
        // records stay ordered by sequence; eviction only removes entries
        self.records
            .binary_search_by_key(&sequence, |r| r.sequence)
            .ok()
    }
}

pub struct CaptureStore {
    state: Mutex<CaptureState>,
    retention_seconds: f64,
    clock: Arc<dyn Clock>,
}

impl CaptureStore {
    pub fn new(config: &CaptureConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &CaptureConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(CaptureState::default()),
            retention_seconds: config.retention_seconds,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CaptureState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn retention_seconds(&self) -> f64 {
        self.retention_seconds
    }

    /// Parse, fingerprint and append. Never fails; malformed payloads yield empty fields.
    pub fn capture(&self, raw_payload: &str) -> PaymentRecord {
        let fields = PaymentFields::parse(raw_payload);
        let fp = fingerprint(raw_payload);
        let timestamp = self.clock.now();

        let mut state = self.lock();
        let record = PaymentRecord {
            sequence: state.next_sequence,
            timestamp,
            raw_payload: raw_payload.to_string(),
            mti: fields.mti,
            pan_masked: mask_pan(&fields.pan),
            amount: fields.amount,
            stan: fields.stan,
            fingerprint: fp,
            replay_count: 0,
        };
        state.next_sequence += 1;
        state.records.push(record.clone());
        drop(state);

        debug!(
            sequence = record.sequence,
            fingerprint = %record.fingerprint,
            mti = %record.mti,
            pan = %record.pan_masked,
            amount = record.amount,
            "captured message"
        );
        record
    }

    /// Unreplayed authorization requests inside the retention window with
    /// `amount >= min_amount`, largest amount first (capture order on ties).
    pub fn get_replayable(&self, min_amount: u64) -> Vec<PaymentRecord> {
        let cutoff = self.clock.now() - self.retention_seconds;
        let state = self.lock();
        let mut out: Vec<PaymentRecord> = state
            .records
            .iter()
            .filter(|r| {
                r.timestamp > cutoff
                    && r.amount >= min_amount
                    && r.class() == MessageClass::Request
                    && !state.replayed.contains(&r.fingerprint)
            })
            .cloned()
            .collect();
        drop(state);
        out.sort_by(|a, b| b.amount.cmp(&a.amount));
        out
    }

    /// Replay a captured record once. The replayed-set check and insert happen
    /// in the same critical section as the `replay_count` bump.
    ///
    /// The re-sent bytes are always the stored copy's. A record whose
    /// fingerprint does not match the stored one at its sequence is rejected
    /// as `UnknownRecord`.
    pub fn replay(
        &self,
        record: &PaymentRecord,
        modify_trace: bool,
    ) -> Result<ReplayOutcome, ReplayError> {
        let stan = modify_trace.then(|| self.fresh_stan());

        let mut state = self.lock();
        let Some(idx) = state.position(record.sequence) else {
            // evicted after its replay: still a double replay
            if state.replayed.contains(&record.fingerprint) {
                return Err(ReplayError::AlreadyReplayed {
                    fingerprint: record.fingerprint.clone(),
                });
            }
            return Err(ReplayError::UnknownRecord {
                sequence: record.sequence,
            });
        };
        if state.records[idx].fingerprint != record.fingerprint {
            drop(state);
            warn!(sequence = record.sequence, "replay request does not match stored record");
            return Err(ReplayError::UnknownRecord {
                sequence: record.sequence,
            });
        }
        let fp = state.records[idx].fingerprint.clone();
        if !state.replayed.insert(fp.clone()) {
            drop(state);
            warn!(fingerprint = %fp, "message already replayed");
            return Err(ReplayError::AlreadyReplayed { fingerprint: fp });
        }
        let stored = &mut state.records[idx];
        stored.replay_count += 1;
        let payload = match &stan {
            Some(stan) => with_stan(&stored.raw_payload, stan),
            None => stored.raw_payload.clone(),
        };
        let replay_count = stored.replay_count;
        let amount = stored.amount;
        drop(state);

        info!(fingerprint = %fp, amount, replay_count, "message replayed");
        Ok(ReplayOutcome {
            payload,
            original_fingerprint: fp,
            replay_count,
        })
    }

    fn fresh_stan(&self) -> String {
        let ms = (self.clock.now() * 1000.0).max(0.0) as u64;
        format!("{:06}", ms % STAN_MODULUS)
    }

    pub fn is_replayed(&self, fingerprint: &str) -> bool {
        self.lock().replayed.contains(fingerprint)
    }

    /// Stored copy of a record, reflecting its current `replay_count`.
    pub fn get(&self, sequence: u64) -> Option<PaymentRecord> {
        let state = self.lock();
        state.position(sequence).map(|i| state.records[i].clone())
    }

    pub fn get_statistics(&self) -> CaptureStatistics {
        let state = self.lock();
        // amounts come off the wire unchecked; totals saturate at u64::MAX
        let amount_captured_sum = state
            .records
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.amount));
        let amount_replayed_sum = state
            .records
            .iter()
            .filter(|r| state.replayed.contains(&r.fingerprint))
            .fold(0u64, |acc, r| acc.saturating_add(r.amount));
        CaptureStatistics {
            total_captured: state.records.len(),
            total_replayed: state.replayed.len(),
            amount_captured_sum,
            amount_replayed_sum,
            retention_seconds: self.retention_seconds,
        }
    }

    /// Retention: drop records outside the window. The replayed set is kept.
    pub fn evict_expired(&self) -> usize {
        let cutoff = self.clock.now() - self.retention_seconds;
        let mut state = self.lock();
        let before = state.records.len();
        state.records.retain(|r| r.timestamp > cutoff);
        let evicted = before - state.records.len();
        if evicted > 0 {
            debug!(evicted, "evicted expired captures");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
