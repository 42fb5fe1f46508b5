//! # Temporal Types — UTC-Only Timestamps
//!
//! Defines `Timestamp`, a UTC-only timestamp type truncated to seconds
//! precision.
//!
//! ## Ordering Invariant
//!
//! Event histories are ordered by timestamp, and the reporting engine
//! computes residency durations by subtracting them. Both require a single
//! unambiguous timeline: all timestamps are UTC with a `Z` suffix and no
//! sub-second component. Non-UTC inputs are rejected by the strict parser
//! rather than silently converted; ingestion of legacy records goes through
//! [`Timestamp::parse_lenient`], which converts to UTC explicitly.
//!
//! Seconds precision also defines the minimal spacing between events of a
//! single command: [`Timestamp::next_second`] is the smallest strictly
//! later timestamp the log can represent.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`] — current UTC time, truncated.
/// - [`Timestamp::from_utc()`] — from a `DateTime<Utc>`, truncating sub-seconds.
/// - [`Timestamp::parse()`] — from an ISO8601 string, rejecting non-UTC offsets.
/// - [`Timestamp::parse_lenient()`] — from an ISO8601 string with any offset,
///   converted to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse a timestamp from an RFC 3339 / ISO8601 string.
    ///
    /// **Rejects non-UTC inputs.** Only timestamps with the `Z` suffix are
    /// accepted, including the semantically equivalent `+00:00`. This is
    /// the constructor for configuration and reporting windows, where an
    /// ambiguous offset would silently shift period boundaries.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid RFC 3339 or uses a
    /// non-Z timezone offset.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if !s.ends_with('Z') {
            return Err(CoreError::InvalidTimestamp(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }

        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            CoreError::InvalidTimestamp(format!("invalid RFC 3339 timestamp {s:?}: {e}"))
        })?;

        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Parse a timestamp from an RFC 3339 string, accepting any timezone
    /// offset and converting to UTC.
    ///
    /// This is the lenient parser used at the legacy-record normalization
    /// boundary. The result is always UTC with seconds precision, matching
    /// the strict invariant.
    pub fn parse_lenient(s: &str) -> Result<Self, CoreError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            CoreError::InvalidTimestamp(format!("invalid RFC 3339 timestamp {s:?}: {e}"))
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Create a timestamp from a Unix epoch timestamp (seconds).
    pub fn from_epoch_secs(secs: i64) -> Result<Self, CoreError> {
        let dt = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| CoreError::InvalidTimestamp(format!("invalid Unix timestamp: {secs}")))?;
        Ok(Self(dt))
    }

    /// Returns the Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// The smallest timestamp strictly later than this one.
    ///
    /// Used by the workflow engine to space the events of a single command:
    /// when a synthesized companion event would collide with the primary
    /// event, the later one is bumped by exactly one second.
    pub fn next_second(&self) -> Self {
        Self(self.0 + Duration::seconds(1))
    }

    /// Whole seconds elapsed from `earlier` to `self` (negative if `self`
    /// precedes `earlier`).
    pub fn secs_since(&self, earlier: Timestamp) -> i64 {
        self.0.timestamp() - earlier.0.timestamp()
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-03-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_has_no_subseconds() {
        let ts = Timestamp::now();
        assert_eq!(ts.as_datetime().nanosecond(), 0);
    }

    #[test]
    fn test_from_utc_truncates() {
        let dt = Utc.with_ymd_and_hms(2026, 3, 15, 12, 30, 45).unwrap();
        let dt_with_nanos = dt.with_nanosecond(123_456_789).unwrap();
        let ts = Timestamp::from_utc(dt_with_nanos);
        assert_eq!(ts.as_datetime().nanosecond(), 0);
        assert_eq!(ts.to_iso8601(), "2026-03-15T12:30:45Z");
    }

    #[test]
    fn test_display_matches_iso8601() {
        let dt = Utc.with_ymd_and_hms(2026, 6, 30, 23, 59, 59).unwrap();
        let ts = Timestamp::from_utc(dt);
        assert_eq!(format!("{ts}"), ts.to_iso8601());
    }

    // ---- parse() strict mode ----

    #[test]
    fn test_parse_z_suffix_accepted() {
        let ts = Timestamp::parse("2026-03-15T12:00:00Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-03-15T12:00:00Z");
    }

    #[test]
    fn test_parse_offsets_rejected() {
        assert!(Timestamp::parse("2026-03-15T12:00:00+00:00").is_err());
        assert!(Timestamp::parse("2026-03-15T17:00:00+05:00").is_err());
        assert!(Timestamp::parse("2026-03-15T08:00:00-04:00").is_err());
    }

    #[test]
    fn test_parse_subseconds_truncated() {
        let ts = Timestamp::parse("2026-03-15T12:00:00.123456Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-03-15T12:00:00Z");
    }

    #[test]
    fn test_parse_invalid_format() {
        assert!(Timestamp::parse("not-a-date").is_err());
        assert!(Timestamp::parse("2026-03-15").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    // ---- parse_lenient() ----

    #[test]
    fn test_parse_lenient_converts_offset() {
        let ts = Timestamp::parse_lenient("2026-03-15T17:00:00+05:00").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-03-15T12:00:00Z");
    }

    // ---- ordering and arithmetic ----

    #[test]
    fn test_ordering() {
        let earlier = Timestamp::parse("2026-03-15T12:00:00Z").unwrap();
        let later = Timestamp::parse("2026-03-15T12:00:01Z").unwrap();
        assert!(earlier < later);
    }

    #[test]
    fn test_next_second_is_minimal_strict_successor() {
        let ts = Timestamp::parse("2026-03-15T12:00:00Z").unwrap();
        let next = ts.next_second();
        assert!(next > ts);
        assert_eq!(next.secs_since(ts), 1);
    }

    #[test]
    fn test_secs_since() {
        let start = Timestamp::parse("2026-03-15T12:00:00Z").unwrap();
        let end = Timestamp::parse("2026-03-15T13:30:00Z").unwrap();
        assert_eq!(end.secs_since(start), 5400);
        assert_eq!(start.secs_since(end), -5400);
    }

    #[test]
    fn test_epoch_roundtrip() {
        let ts = Timestamp::parse("2026-03-15T12:00:00Z").unwrap();
        let ts2 = Timestamp::from_epoch_secs(ts.epoch_secs()).unwrap();
        assert_eq!(ts, ts2);
    }

    // ---- serde ----

    #[test]
    fn test_serde_roundtrip() {
        let ts = Timestamp::parse("2026-03-15T12:00:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, parsed);
    }
}
