//! # UTC Timestamps
//!
//! `Timestamp` is UTC-only, truncated to seconds, and renders as
//! `YYYY-MM-DDTHH:MM:SSZ`. Non-UTC inputs are rejected at parse time rather
//! than silently converted.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A UTC-only timestamp with seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// From a `DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 string. Only the `Z` suffix is accepted.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if !s.ends_with('Z') {
            return Err(CoreError::InvalidTimestamp(format!(
                "timestamp must use Z suffix (UTC only), got {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| CoreError::InvalidTimestamp(format!("{s:?}: {e}")))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Unix epoch seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Render as ISO8601 with Z suffix.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_has_no_subseconds() {
        assert_eq!(Timestamp::now().as_datetime().nanosecond(), 0);
    }

    #[test]
    fn test_from_utc_truncates() {
        let dt = Utc
            .with_ymd_and_hms(2026, 1, 15, 12, 30, 45)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        assert_eq!(Timestamp::from_utc(dt).to_iso8601(), "2026-01-15T12:30:45Z");
    }

    #[test]
    fn test_parse_rejects_offsets() {
        assert!(Timestamp::parse("2026-01-15T12:00:00Z").is_ok());
        assert!(Timestamp::parse("2026-01-15T12:00:00+00:00").is_err());
        assert!(Timestamp::parse("2026-01-15T08:00:00-04:00").is_err());
        assert!(Timestamp::parse("not-a-date").is_err());
    }

    #[test]
    fn test_serde_roundtrip_preserves_instant() {
        let ts = Timestamp::parse("2026-06-30T23:59:59Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, back);
        assert_eq!(back.epoch_secs(), ts.epoch_secs());
    }
}
