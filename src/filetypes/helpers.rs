use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch, zero if the clock is set before it
pub fn timestamp_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
