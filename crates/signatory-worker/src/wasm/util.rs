use chrono::{TimeZone, Utc};

use getrandom::fill;

use crate::core::identity::hex_encode;

pub fn now_ts() -> i64 {
    Utc::now().timestamp()
}

pub fn ts_to_rfc3339(ts: i64) -> String {
    Utc.timestamp_opt(ts, 0)
        .single()
        .unwrap_or_else(|| Utc.timestamp_opt(0, 0).single().unwrap())
        .to_rfc3339()
}

pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    fill(&mut out).expect("Failed to generate random bytes");
    out
}

/// Row ids are 128-bit random values, hex-encoded.
pub fn new_id() -> String {
    hex_encode(&random_bytes(16))
}
