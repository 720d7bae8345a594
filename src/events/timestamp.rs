//! Protocol timestamp conversion.
//!
//! Runtime and Log events carry milliseconds since epoch; `Network` requests
//! carry `wallTime` in seconds. Missing or unrepresentable values fall back
//! to the current time.

use chrono::{DateTime, Utc};

/// Converts milliseconds since epoch to a UTC instant.
#[must_use]
pub fn from_millis(millis: Option<f64>) -> DateTime<Utc> {
    from_micros(millis.map(|ms| ms * 1_000.0))
}

/// Converts seconds since epoch to a UTC instant.
#[must_use]
pub fn from_seconds(seconds: Option<f64>) -> DateTime<Utc> {
    from_micros(seconds.map(|s| s * 1_000_000.0))
}

fn from_micros(micros: Option<f64>) -> DateTime<Utc> {
    micros
        .filter(|us| us.is_finite() && us.abs() < i64::MAX as f64)
        .and_then(|us| DateTime::from_timestamp_micros(us.round() as i64))
        .unwrap_or_else(Utc::now)
}

/// Formats the wall-clock part used by human-readable renderings.
#[inline]
#[must_use]
pub fn clock(ts: &DateTime<Utc>) -> String {
    ts.format("%H:%M:%S%.3f").to_string()
}
