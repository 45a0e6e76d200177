//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// RFC 3339 rendering used in metadata and API payloads.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Seconds since the Unix epoch, with sub-second precision.
    pub fn unix_seconds(&self) -> f64 {
        self.0.timestamp_millis() as f64 / 1000.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn unix_seconds_keeps_millis() {
        let dt = Utc.timestamp_millis_opt(1_700_000_000_250).unwrap();
        let ts = Timestamp::from_datetime(dt);
        assert!((ts.unix_seconds() - 1_700_000_000.25).abs() < 1e-6);
    }

    #[test]
    fn timestamps_order_chronologically() {
        let earlier = Timestamp::from_datetime(Utc.timestamp_opt(10, 0).unwrap());
        let later = Timestamp::from_datetime(Utc.timestamp_opt(20, 0).unwrap());
        assert!(earlier < later);
    }
}
