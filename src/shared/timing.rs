//! Timing helpers for request instrumentation.

use std::time::Duration;

/// Whole milliseconds, saturating.
pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Seconds as a user would read them: `15`, `1.5`, `0.25`.
pub fn seconds_label(duration: Duration) -> String {
    let ms = millis(duration);
    if ms % 1000 == 0 {
        (ms / 1000).to_string()
    } else {
        (ms as f64 / 1000.0).to_string()
    }
}

/// True when `elapsed` is strictly over `threshold`.
pub fn is_slow(elapsed: Duration, threshold: Duration) -> bool {
    elapsed > threshold
}
