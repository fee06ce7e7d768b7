//! Pipe-delimited payment framing: `MTI|PAN|ProcessingCode|Amount|STAN[|ResponseCode|AuthCode]`.

use sha2::{Digest, Sha256};

/// Authorization request; the only class the capture store will replay.
pub const AUTHORIZATION_REQUEST_MTI: &str = "0100";

const FINGERPRINT_HEX_LEN: usize = 16;
const STAN_FIELD: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageClass {
    Request,
    Response,
    Other,
}

impl MessageClass {
    pub fn from_mti(mti: &str) -> Self {
        match mti {
            AUTHORIZATION_REQUEST_MTI => MessageClass::Request,
            "0110" => MessageClass::Response,
            _ => MessageClass::Other,
        }
    }
}

/// Positional fields of one message. Absent positions are empty; an absent or
/// non-numeric amount is 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentFields {
    pub mti: String,
    pub pan: String,
    pub processing_code: String,
    pub amount: u64,
    pub stan: String,
    pub response_code: Option<String>,
    pub auth_code: Option<String>,
}

impl PaymentFields {
    pub fn parse(raw: &str) -> Self {
        let parts: Vec<&str> = raw.split('|').collect();
        let at = |i: usize| parts.get(i).map(|s| s.to_string()).unwrap_or_default();
        let optional = |i: usize| {
            parts
                .get(i)
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        };
        Self {
            mti: at(0),
            pan: at(1),
            processing_code: at(2),
            amount: parts
                .get(3)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(0),
            stan: at(STAN_FIELD),
            response_code: optional(5),
            auth_code: optional(6),
        }
    }
}

/// `****` followed by the last four characters; `****` alone for short input.
pub fn mask_pan(pan: &str) -> String {
    let chars: Vec<char> = pan.chars().collect();
    if chars.len() < 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

/// Truncated SHA-256 over the raw payload bytes.
pub fn fingerprint(raw: &str) -> String {
    let mut h = Sha256::new();
    h.update(raw.as_bytes());
    let mut hex = format!("{:x}", h.finalize());
    hex.truncate(FINGERPRINT_HEX_LEN);
    hex
}

/// Replace the STAN position, leaving every other field untouched. Payloads
/// without a STAN position come back unchanged.
pub(crate) fn with_stan(raw: &str, stan: &str) -> String {
    let mut parts: Vec<&str> = raw.split('|').collect();
    if parts.len() > STAN_FIELD {
        parts[STAN_FIELD] = stan;
    }
    parts.join("|")
}
